mod common;

use dynproto::{DynamicMessage, Encode, MessageBuilder, MessageDescriptor, Value};

use common::{init_logger, message, pool};

fn fill(desc: &MessageDescriptor, prefix: &str) -> DynamicMessage {
    let mut builder = MessageBuilder::new(desc.clone());
    let field = |name: &str| desc.get_field_by_name(&format!("{prefix}_{name}")).unwrap();
    builder
        .set_field(&field("int32"), Value::List(vec![Value::I32(601), Value::I32(-1)]))
        .set_field(&field("sint64"), Value::List(vec![Value::I64(-2), Value::I64(2)]))
        .set_field(&field("fixed32"), Value::List(vec![Value::U32(7)]))
        .set_field(&field("double"), Value::List(vec![Value::F64(0.5), Value::F64(-0.0)]))
        .set_field(&field("bool"), Value::List(vec![Value::Bool(true), Value::Bool(false)]))
        .set_field(&field("enum"), Value::List(vec![Value::EnumNumber(3), Value::EnumNumber(1)]));
    builder.build()
}

#[test]
fn packed_wire_format() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.TestPackedTypes");
    let mut builder = MessageBuilder::new(desc.clone());
    builder.set_field_by_name("packed_int32", Value::List(vec![Value::I32(3), Value::I32(270), Value::I32(86942)]));
    assert_eq!(
        builder.build().encode_to_vec(),
        [0xD2, 0x05, 0x06, 0x03, 0x8E, 0x02, 0x9E, 0xA7, 0x05]
    );

    let mut builder = MessageBuilder::new(desc);
    builder.set_field_by_name("packed_int32", Value::List(Vec::new()));
    assert!(builder.build().encode_to_vec().is_empty());
}

#[test]
fn packed_and_unpacked_parse_interchangeably() {
    init_logger();
    let pool = pool();
    let packed_desc = message(&pool, "test.TestPackedTypes");
    let unpacked_desc = message(&pool, "test.TestUnpackedTypes");
    let packed = fill(&packed_desc, "packed");
    let unpacked = fill(&unpacked_desc, "unpacked");

    let packed_bytes = packed.encode_to_vec();
    let unpacked_bytes = unpacked.encode_to_vec();
    assert!(packed_bytes.len() < unpacked_bytes.len());

    assert_eq!(DynamicMessage::parse_from(packed_desc.clone(), &unpacked_bytes).unwrap(), packed);
    assert_eq!(DynamicMessage::parse_from(unpacked_desc.clone(), &packed_bytes).unwrap(), unpacked);
}

#[test]
fn mixed_packed_and_unpacked_elements_concatenate() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.TestUnpackedTypes");
    // unpacked_int32: 1, then packed [2, 3], then 4
    let bytes = [0xD0, 0x05, 0x01, 0xD2, 0x05, 0x02, 0x02, 0x03, 0xD0, 0x05, 0x04];
    let parsed = DynamicMessage::parse_from(desc, &bytes).unwrap();
    assert_eq!(
        parsed.get_field_by_name("unpacked_int32").unwrap().into_owned(),
        Value::List((1..=4).map(Value::I32).collect())
    );
    assert_eq!(
        parsed.encode_to_vec(),
        [0xD0, 0x05, 0x01, 0xD0, 0x05, 0x02, 0xD0, 0x05, 0x03, 0xD0, 0x05, 0x04]
    );
}

#[test]
fn packed_payload_must_end_on_an_element() {
    init_logger();
    let pool = pool();
    let desc = message(&pool, "test.TestPackedTypes");
    // packed_fixed32 with a five-byte payload.
    let bytes = [0xF2, 0x05, 0x05, 0x01, 0x00, 0x00, 0x00, 0x02];
    let err = DynamicMessage::parse_from(desc, &bytes).unwrap_err();
    assert_eq!(err.kind(), &dynproto::DecodeErrorKind::Truncated);
}
