mod common;

use dynproto::{DynamicMessage, Encode, MessageBuilder, Value};

use common::{all_types, init_logger, message, pool};

#[test]
fn all_types_roundtrip() {
    init_logger();
    let pool = pool();
    let original = all_types(&pool);
    let bytes = original.encode_to_vec();
    assert_eq!(bytes.len(), original.encoded_len());

    let parsed = DynamicMessage::parse_from(message(&pool, "test.TestAllTypes"), &bytes).unwrap();
    assert_eq!(parsed, original);
    assert_eq!(parsed.encode_to_vec(), bytes);
    assert!(parsed.unknown_fields().is_empty());

    let streamed = DynamicMessage::parse_from_read(
        message(&pool, "test.TestAllTypes"),
        bytes.as_slice(),
        dynproto::ExtensionRegistry::empty(),
    )
    .unwrap();
    assert_eq!(streamed, original);
}

#[test]
fn exact_scalar_encodings() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.TestAllTypes");
    let encode = |name: &str, value: Value| {
        let mut builder = MessageBuilder::new(desc.clone());
        builder.set_field_by_name(name, value);
        builder.build().encode_to_vec()
    };

    assert_eq!(encode("optional_int32", Value::I32(150)), [0x08, 0x96, 0x01]);
    assert_eq!(
        encode("optional_int32", Value::I32(-1)),
        [0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
    );
    assert_eq!(encode("optional_sint32", Value::I32(-105)), [0x28, 0xD1, 0x01]);
    assert_eq!(
        encode("optional_fixed32", Value::U32(0x0102_0304)),
        [0x3D, 0x04, 0x03, 0x02, 0x01]
    );
    assert_eq!(
        encode("optional_double", Value::F64(1.0)),
        [0x61, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F]
    );
    assert_eq!(encode("optional_string", Value::from("hi")), [0x72, 0x02, b'h', b'i']);
    assert_eq!(
        encode("optional_nested_enum", Value::EnumNumber(-1)),
        [0xA8, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
    );

    let mut group = MessageBuilder::new(message(&pool, "test.OptionalGroup"));
    group.set_field_by_name("a", Value::I32(117));
    assert_eq!(
        encode("optionalgroup", Value::Message(group.build())),
        [0x83, 0x01, 0x88, 0x01, 0x75, 0x84, 0x01]
    );
}

#[test]
fn fields_are_written_in_number_order() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.TestAllTypes");
    let mut builder = MessageBuilder::new(desc);
    builder
        .set_field_by_name("optional_bool", Value::Bool(true))
        .set_field_by_name("optional_int32", Value::I32(1))
        .set_field_by_name("optional_uint32", Value::U32(3));
    assert_eq!(
        builder.build().encode_to_vec(),
        [0x08, 0x01, 0x18, 0x03, 0x68, 0x01]
    );
}

#[test]
fn defaults() {
    init_logger();
    let pool = pool();
    let empty = DynamicMessage::parse_from(message(&pool, "test.TestAllTypes"), &[]).unwrap();
    assert_eq!(empty.encoded_len(), 0);

    let get = |name: &str| empty.get_field_by_name(name).unwrap().into_owned();
    assert_eq!(get("default_int32"), Value::I32(41));
    assert_eq!(get("default_string"), Value::from("hello"));
    assert_eq!(get("default_nested_enum"), Value::EnumNumber(2));
    assert_eq!(get("optional_nested_enum"), Value::EnumNumber(1));
    assert_eq!(get("optional_bytes"), Value::Bytes(Default::default()));
    assert_eq!(get("repeated_int32"), Value::List(Vec::new()));

    let field = empty.descriptor().get_field_by_name("default_int32").unwrap();
    assert!(!empty.has_field(&field));
}

#[test]
fn explicit_presence_keeps_default_values() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.TestAllTypes");
    let mut builder = MessageBuilder::new(desc.clone());
    builder.set_field_by_name("optional_int32", Value::I32(0));
    let message = builder.build();
    assert_eq!(message.encode_to_vec(), [0x08, 0x00]);
    assert!(message.has_field(&desc.get_field(1).unwrap()));
}

#[test]
fn implicit_presence_and_oneofs() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.Proto3Message");
    let value = desc.get_field_by_name("value").unwrap();

    let mut builder = MessageBuilder::new(desc.clone());
    builder.set_field(&value, Value::I32(0));
    assert!(!builder.has_field(&value));
    builder
        .set_field(&value, Value::I32(5))
        .set_field_by_name("num", Value::I64(7))
        .set_field_by_name("text", Value::from("x"));
    let message = builder.build();
    assert_eq!(message.encode_to_vec(), [0x08, 0x05, 0x22, 0x01, b'x']);

    let oneof = desc.oneofs().next().unwrap();
    assert_eq!(message.which_oneof(&oneof).unwrap().name(), "text");

    // A zero on the wire leaves the field unset.
    let parsed = DynamicMessage::parse_from(desc.clone(), &[0x08, 0x00, 0x18, 0x02]).unwrap();
    assert!(!parsed.has_field(&value));
    assert_eq!(parsed.which_oneof(&oneof).unwrap().name(), "num");
    assert_eq!(parsed.encode_to_vec(), [0x18, 0x02]);
}

#[test]
fn nan_compares_equal_to_itself() {
    init_logger();
    let pool = pool();
    let mut builder = MessageBuilder::new(message(&pool, "test.TestAllTypes"));
    builder.set_field_by_name("optional_double", Value::F64(f64::NAN));
    let message = builder.build();
    let parsed = DynamicMessage::parse_from(message.descriptor().clone(), &message.encode_to_vec()).unwrap();
    assert_eq!(parsed, message);
}

#[test]
fn to_builder_copies() {
    init_logger();
    let pool = pool();
    let original = all_types(&pool);
    let mut builder = original.to_builder();
    builder.set_field_by_name("optional_int32", Value::I32(9));
    let changed = builder.build();
    assert_ne!(changed, original);
    assert_eq!(original.get_field_by_name("optional_int32").unwrap().as_i32(), Some(101));
    assert_eq!(changed.get_field_by_name("optional_int32").unwrap().as_i32(), Some(9));
}

#[test]
fn encode_length_delimited() {
    init_logger();
    let pool = pool();
    let mut builder = MessageBuilder::new(message(&pool, "test.TestAllTypes"));
    builder.set_field_by_name("optional_int32", Value::I32(150));
    let message = builder.build();
    assert_eq!(message.encode_length_delimited_to_vec(), [0x03, 0x08, 0x96, 0x01]);

    let mut buf = Vec::new();
    message.encode_length_delimited(&mut buf).unwrap();
    assert_eq!(dynproto::decode_length_delimiter(buf.as_slice()).unwrap(), 3);
}
