#![no_main]

use std::sync::OnceLock;

use dynproto::{
    DescriptorPool, DynamicMessage, Encode, EnumDef, ExtensionRegistry, FieldDef, MessageDef,
    Type,
};
use libfuzzer_sys::fuzz_target;

struct Schema {
    pool: DescriptorPool,
    registry: ExtensionRegistry,
}

fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let pool = DescriptorPool::builder()
            .enumeration(EnumDef::new("fuzz.Color").value("RED", 0).value("GREEN", 1))
            .message(
                MessageDef::new("fuzz.Root")
                    .field(FieldDef::new("int", 1, Type::Int32))
                    .field(FieldDef::new("sint", 2, Type::Sint64))
                    .field(FieldDef::new("fixed", 3, Type::Fixed32).repeated().packed())
                    .field(FieldDef::new("double", 4, Type::Double).repeated())
                    .field(FieldDef::new("text", 5, Type::String))
                    .field(FieldDef::new("data", 6, Type::Bytes).repeated())
                    .field(FieldDef::new("color", 7, Type::Enum).repeated().type_name("fuzz.Color"))
                    .field(FieldDef::new("child", 8, Type::Message).type_name("fuzz.Root"))
                    .field(FieldDef::new("children", 9, Type::Message).repeated().type_name("fuzz.Root"))
                    .field(FieldDef::new("group", 10, Type::Group).type_name("fuzz.Group"))
                    .field(FieldDef::new("set", 11, Type::Message).type_name("fuzz.Set"))
                    .field(FieldDef::new("flag", 12, Type::Bool).oneof("choice"))
                    .field(FieldDef::new("label", 13, Type::String).oneof("choice"))
                    .field(FieldDef::new("count", 14, Type::Uint32).implicit_presence())
                    .extension_range(100..200),
            )
            .message(MessageDef::new("fuzz.Group").field(FieldDef::new("value", 11, Type::Uint64)))
            .message(MessageDef::new("fuzz.Set").extension_range(4..536_870_912).message_set_wire_format())
            .extension(FieldDef::new("fuzz.ext_int", 100, Type::Int64).extendee("fuzz.Root"))
            .extension(
                FieldDef::new("fuzz.ext_root", 101, Type::Message)
                    .type_name("fuzz.Root")
                    .extendee("fuzz.Root"),
            )
            .extension(
                FieldDef::new("fuzz.item", 1000, Type::Message)
                    .type_name("fuzz.Root")
                    .extendee("fuzz.Set"),
            )
            .build();
        let pool = match pool {
            Ok(pool) => pool,
            Err(error) => panic!("invalid fuzz schema: {error}"),
        };
        let registry = ExtensionRegistry::from_pool(&pool);
        Schema { pool, registry }
    })
}

fuzz_target!(|data: &[u8]| {
    let schema = schema();
    let Some(desc) = schema.pool.get_message_by_name("fuzz.Root") else {
        return;
    };

    let Ok(message) = DynamicMessage::parse_partial_from(desc.clone(), data, &schema.registry) else {
        return;
    };

    // Whatever parses must re-encode to bytes that parse back to the same message.
    let encoded = message.encode_to_vec();
    assert_eq!(encoded.len(), message.encoded_len());
    let reparsed = DynamicMessage::parse_partial_from(desc, &encoded, &schema.registry)
        .expect("re-encoded message failed to parse");
    assert_eq!(reparsed, message);
    assert_eq!(reparsed.encode_to_vec(), encoded);
});
