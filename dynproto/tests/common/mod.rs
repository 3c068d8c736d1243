#![allow(dead_code)]

use dynproto::encoding::{encode_varint, MAX_TAG};
use dynproto::{
    DescriptorPool, DynamicMessage, EnumDef, ExtensionRegistry, FieldDef, MessageBuilder,
    MessageDef, MessageDescriptor, Type, Value,
};

pub const MESSAGE_SET_EXTENSION1: u32 = 1545008;
pub const MESSAGE_SET_EXTENSION2: u32 = 1547769;
pub const MESSAGE_SET_UNREGISTERED: u32 = 1550055;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The schema shared by the integration tests.
pub fn pool() -> DescriptorPool {
    DescriptorPool::builder()
        .enumeration(
            EnumDef::new("test.NestedEnum")
                .value("FOO", 1)
                .value("BAR", 2)
                .value("BAZ", 3)
                .value("NEG", -1),
        )
        .message(MessageDef::new("test.NestedMessage").field(FieldDef::new("bb", 1, Type::Int32)))
        .message(MessageDef::new("test.OptionalGroup").field(FieldDef::new("a", 17, Type::Int32)))
        .message(
            MessageDef::new("test.TestAllTypes")
                .field(FieldDef::new("optional_int32", 1, Type::Int32))
                .field(FieldDef::new("optional_int64", 2, Type::Int64))
                .field(FieldDef::new("optional_uint32", 3, Type::Uint32))
                .field(FieldDef::new("optional_uint64", 4, Type::Uint64))
                .field(FieldDef::new("optional_sint32", 5, Type::Sint32))
                .field(FieldDef::new("optional_sint64", 6, Type::Sint64))
                .field(FieldDef::new("optional_fixed32", 7, Type::Fixed32))
                .field(FieldDef::new("optional_fixed64", 8, Type::Fixed64))
                .field(FieldDef::new("optional_sfixed32", 9, Type::Sfixed32))
                .field(FieldDef::new("optional_sfixed64", 10, Type::Sfixed64))
                .field(FieldDef::new("optional_float", 11, Type::Float))
                .field(FieldDef::new("optional_double", 12, Type::Double))
                .field(FieldDef::new("optional_bool", 13, Type::Bool))
                .field(FieldDef::new("optional_string", 14, Type::String))
                .field(FieldDef::new("optional_bytes", 15, Type::Bytes))
                .field(FieldDef::new("optionalgroup", 16, Type::Group).type_name("test.OptionalGroup"))
                .field(
                    FieldDef::new("optional_nested_message", 18, Type::Message)
                        .type_name("test.NestedMessage"),
                )
                .field(FieldDef::new("optional_nested_enum", 21, Type::Enum).type_name("test.NestedEnum"))
                .field(FieldDef::new("repeated_int32", 31, Type::Int32).repeated())
                .field(FieldDef::new("repeated_string", 44, Type::String).repeated())
                .field(
                    FieldDef::new("repeated_nested_message", 48, Type::Message)
                        .repeated()
                        .type_name("test.NestedMessage"),
                )
                .field(
                    FieldDef::new("repeated_nested_enum", 51, Type::Enum)
                        .repeated()
                        .type_name("test.NestedEnum"),
                )
                .field(FieldDef::new("default_int32", 61, Type::Int32).default_value(Value::I32(41)))
                .field(
                    FieldDef::new("default_string", 72, Type::String)
                        .default_value(Value::from("hello")),
                )
                .field(
                    FieldDef::new("default_nested_enum", 81, Type::Enum)
                        .type_name("test.NestedEnum")
                        .default_value(Value::EnumNumber(2)),
                ),
        )
        .message(
            MessageDef::new("test.TestPackedTypes")
                .field(FieldDef::new("packed_int32", 90, Type::Int32).repeated().packed())
                .field(FieldDef::new("packed_sint64", 93, Type::Sint64).repeated().packed())
                .field(FieldDef::new("packed_fixed32", 94, Type::Fixed32).repeated().packed())
                .field(FieldDef::new("packed_double", 99, Type::Double).repeated().packed())
                .field(FieldDef::new("packed_bool", 100, Type::Bool).repeated().packed())
                .field(
                    FieldDef::new("packed_enum", 103, Type::Enum)
                        .repeated()
                        .packed()
                        .type_name("test.NestedEnum"),
                ),
        )
        .message(
            MessageDef::new("test.TestUnpackedTypes")
                .field(FieldDef::new("unpacked_int32", 90, Type::Int32).repeated())
                .field(FieldDef::new("unpacked_sint64", 93, Type::Sint64).repeated())
                .field(FieldDef::new("unpacked_fixed32", 94, Type::Fixed32).repeated())
                .field(FieldDef::new("unpacked_double", 99, Type::Double).repeated())
                .field(FieldDef::new("unpacked_bool", 100, Type::Bool).repeated())
                .field(
                    FieldDef::new("unpacked_enum", 103, Type::Enum)
                        .repeated()
                        .type_name("test.NestedEnum"),
                ),
        )
        .message(
            MessageDef::new("test.TestRequired")
                .field(FieldDef::new("a", 1, Type::Int32).required())
                .field(FieldDef::new("b", 2, Type::Int32))
                .field(FieldDef::new("c", 3, Type::Int32).required()),
        )
        .message(
            MessageDef::new("test.TestRequiredForeign")
                .field(
                    FieldDef::new("optional_message", 1, Type::Message).type_name("test.TestRequired"),
                )
                .field(
                    FieldDef::new("repeated_message", 2, Type::Message)
                        .repeated()
                        .type_name("test.TestRequired"),
                )
                .field(FieldDef::new("dummy", 3, Type::Int32)),
        )
        .message(MessageDef::new("test.TestAllExtensions").extension_range(1..MAX_TAG + 1))
        .extension(
            FieldDef::new("test.optional_int32_extension", 1, Type::Int32)
                .extendee("test.TestAllExtensions"),
        )
        .extension(
            FieldDef::new("test.repeated_string_extension", 44, Type::String)
                .repeated()
                .extendee("test.TestAllExtensions"),
        )
        .extension(
            FieldDef::new("test.optional_nested_message_extension", 18, Type::Message)
                .type_name("test.NestedMessage")
                .extendee("test.TestAllExtensions"),
        )
        .extension(
            FieldDef::new("test.required_message_extension", 1000, Type::Message)
                .type_name("test.TestRequired")
                .extendee("test.TestAllExtensions"),
        )
        .message(
            MessageDef::new("test.TestMessageSet")
                .extension_range(4..MAX_TAG + 1)
                .message_set_wire_format(),
        )
        .message(
            MessageDef::new("test.TestMessageSetContainer")
                .field(FieldDef::new("message_set", 1, Type::Message).type_name("test.TestMessageSet")),
        )
        .message(MessageDef::new("test.TestMessageSetExtension1").field(FieldDef::new("i", 15, Type::Int32)))
        .message(
            MessageDef::new("test.TestMessageSetExtension2").field(FieldDef::new("str", 25, Type::String)),
        )
        .extension(
            FieldDef::new("test.message_set_extension1", MESSAGE_SET_EXTENSION1, Type::Message)
                .type_name("test.TestMessageSetExtension1")
                .extendee("test.TestMessageSet"),
        )
        .extension(
            FieldDef::new("test.message_set_extension2", MESSAGE_SET_EXTENSION2, Type::Message)
                .type_name("test.TestMessageSetExtension2")
                .extendee("test.TestMessageSet"),
        )
        .message(
            MessageDef::new("test.TestRecursiveMessage")
                .field(FieldDef::new("a", 1, Type::Message).type_name("test.TestRecursiveMessage"))
                .field(FieldDef::new("i", 2, Type::Int32)),
        )
        .message(
            MessageDef::new("test.Proto3Message")
                .field(FieldDef::new("value", 1, Type::Int32).implicit_presence())
                .field(FieldDef::new("name", 2, Type::String).implicit_presence())
                .field(FieldDef::new("num", 3, Type::Int64).oneof("kind"))
                .field(FieldDef::new("text", 4, Type::String).oneof("kind")),
        )
        .build()
        .unwrap()
}

pub fn message(pool: &DescriptorPool, name: &str) -> MessageDescriptor {
    pool.get_message_by_name(name).unwrap()
}

pub fn registry(pool: &DescriptorPool) -> ExtensionRegistry {
    ExtensionRegistry::from_pool(pool)
}

/// A `test.TestAllTypes` with every singular field set and two elements in every repeated one.
pub fn all_types(pool: &DescriptorPool) -> DynamicMessage {
    let nested = |bb| {
        let mut builder = MessageBuilder::new(message(pool, "test.NestedMessage"));
        builder.set_field_by_name("bb", Value::I32(bb));
        Value::Message(builder.build())
    };
    let mut group = MessageBuilder::new(message(pool, "test.OptionalGroup"));
    group.set_field_by_name("a", Value::I32(117));

    let mut builder = MessageBuilder::new(message(pool, "test.TestAllTypes"));
    builder
        .set_field_by_name("optional_int32", Value::I32(101))
        .set_field_by_name("optional_int64", Value::I64(102))
        .set_field_by_name("optional_uint32", Value::U32(103))
        .set_field_by_name("optional_uint64", Value::U64(104))
        .set_field_by_name("optional_sint32", Value::I32(-105))
        .set_field_by_name("optional_sint64", Value::I64(-106))
        .set_field_by_name("optional_fixed32", Value::U32(107))
        .set_field_by_name("optional_fixed64", Value::U64(108))
        .set_field_by_name("optional_sfixed32", Value::I32(-109))
        .set_field_by_name("optional_sfixed64", Value::I64(-110))
        .set_field_by_name("optional_float", Value::F32(111.5))
        .set_field_by_name("optional_double", Value::F64(112.25))
        .set_field_by_name("optional_bool", Value::Bool(true))
        .set_field_by_name("optional_string", Value::from("115"))
        .set_field_by_name("optional_bytes", Value::Bytes(b"116".as_slice().into()))
        .set_field_by_name("optionalgroup", Value::Message(group.build()))
        .set_field_by_name("optional_nested_message", nested(118))
        .set_field_by_name("optional_nested_enum", Value::EnumNumber(3))
        .set_field_by_name("repeated_int32", Value::List(vec![Value::I32(201), Value::I32(-301)]))
        .set_field_by_name(
            "repeated_string",
            Value::List(vec![Value::from("215"), Value::from("315")]),
        )
        .set_field_by_name("repeated_nested_message", Value::List(vec![nested(218), nested(318)]))
        .set_field_by_name(
            "repeated_nested_enum",
            Value::List(vec![Value::EnumNumber(2), Value::EnumNumber(-1)]),
        )
        .set_field_by_name("default_int32", Value::I32(401))
        .set_field_by_name("default_string", Value::from("415"));
    builder.build()
}

/// `depth` levels of `test.TestRecursiveMessage` nested through field `a`.
pub fn recursive_bytes(depth: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for _ in 0..depth {
        let mut outer = vec![0x0A];
        encode_varint(bytes.len() as u64, &mut outer);
        outer.extend_from_slice(&bytes);
        bytes = outer;
    }
    bytes
}
