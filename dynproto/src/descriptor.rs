//! Message schemas.
//!
//! A [`DescriptorPool`] is assembled once from [`MessageDef`], [`EnumDef`] and extension
//! [`FieldDef`] definitions, which may refer to each other (and to themselves) by full name.
//! The pool hands out cheap handles ([`MessageDescriptor`], [`FieldDescriptor`],
//! [`EnumDescriptor`], [`OneofDescriptor`]) that compare by identity: two handles are equal
//! only if they come from the same pool and name the same definition.

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Range;

use crate::encoding::WireType;
use crate::error::DescriptorError;
use crate::value::Value;

/// The declared type of a field, as written in a definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    /// A tag-delimited nested message. Requires a type name.
    Group,
    /// A length-delimited nested message. Requires a type name.
    Message,
    Bytes,
    Uint32,
    /// Requires a type name.
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

/// Whether a field holds at most one value, exactly one value, or a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cardinality {
    #[default]
    Optional,
    Required,
    Repeated,
}

/// The resolved type of a field.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Enum(EnumDescriptor),
    Message(MessageDescriptor),
    Group(MessageDescriptor),
}

impl Kind {
    /// The wire type a single value of this kind is written with.
    pub fn wire_type(&self) -> WireType {
        match self {
            Kind::Double | Kind::Fixed64 | Kind::Sfixed64 => WireType::SixtyFourBit,
            Kind::Float | Kind::Fixed32 | Kind::Sfixed32 => WireType::ThirtyTwoBit,
            Kind::Int64
            | Kind::Uint64
            | Kind::Int32
            | Kind::Bool
            | Kind::Uint32
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Enum(_) => WireType::Varint,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
            Kind::Group(_) => WireType::StartGroup,
        }
    }

    /// Returns `true` for the scalar kinds a repeated field may pack.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            Kind::String | Kind::Bytes | Kind::Message(_) | Kind::Group(_)
        )
    }

    /// The message type of a `Message` or `Group` kind.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(desc) | Kind::Group(desc) => Some(desc),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(desc) => Some(desc),
            _ => None,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Double => f.write_str("double"),
            Kind::Float => f.write_str("float"),
            Kind::Int64 => f.write_str("int64"),
            Kind::Uint64 => f.write_str("uint64"),
            Kind::Int32 => f.write_str("int32"),
            Kind::Fixed64 => f.write_str("fixed64"),
            Kind::Fixed32 => f.write_str("fixed32"),
            Kind::Bool => f.write_str("bool"),
            Kind::String => f.write_str("string"),
            Kind::Bytes => f.write_str("bytes"),
            Kind::Uint32 => f.write_str("uint32"),
            Kind::Sfixed32 => f.write_str("sfixed32"),
            Kind::Sfixed64 => f.write_str("sfixed64"),
            Kind::Sint32 => f.write_str("sint32"),
            Kind::Sint64 => f.write_str("sint64"),
            Kind::Enum(desc) => write!(f, "enum {}", desc.full_name()),
            Kind::Message(desc) => write!(f, "message {}", desc.full_name()),
            Kind::Group(desc) => write!(f, "group {}", desc.full_name()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KindIndex {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Enum(usize),
    Message(usize),
    Group(usize),
}

impl KindIndex {
    fn is_packable(self) -> bool {
        !matches!(
            self,
            KindIndex::String | KindIndex::Bytes | KindIndex::Message(_) | KindIndex::Group(_)
        )
    }

    fn is_message(self) -> bool {
        matches!(self, KindIndex::Message(_) | KindIndex::Group(_))
    }
}

/// The definition of a single field, either declared inside a [`MessageDef`] or registered as
/// an extension with [`DescriptorPoolBuilder::extension`].
#[derive(Clone, Debug)]
pub struct FieldDef {
    name: String,
    number: u32,
    ty: Type,
    cardinality: Cardinality,
    packed: bool,
    implicit_presence: bool,
    type_name: Option<String>,
    default_value: Option<Value>,
    oneof: Option<String>,
    extendee: Option<String>,
}

impl FieldDef {
    /// Defines a field. Extension names are full names, e.g. `pkg.my_extension`.
    pub fn new(name: impl Into<String>, number: u32, ty: Type) -> FieldDef {
        FieldDef {
            name: name.into(),
            number,
            ty,
            cardinality: Cardinality::Optional,
            packed: false,
            implicit_presence: false,
            type_name: None,
            default_value: None,
            oneof: None,
            extendee: None,
        }
    }

    pub fn required(mut self) -> FieldDef {
        self.cardinality = Cardinality::Required;
        self
    }

    pub fn repeated(mut self) -> FieldDef {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Marks a repeated scalar field to be written in packed form.
    pub fn packed(mut self) -> FieldDef {
        self.packed = true;
        self
    }

    /// Marks a singular scalar field as having no presence: it counts as set only while
    /// holding a non-default value.
    pub fn implicit_presence(mut self) -> FieldDef {
        self.implicit_presence = true;
        self
    }

    /// The full name of the message or enum type of a `Message`, `Group` or `Enum` field.
    pub fn type_name(mut self, name: impl Into<String>) -> FieldDef {
        self.type_name = Some(name.into());
        self
    }

    /// An explicit default for a singular scalar or enum field.
    pub fn default_value(mut self, value: Value) -> FieldDef {
        self.default_value = Some(value);
        self
    }

    /// Places the field in the named oneof of its message.
    pub fn oneof(mut self, name: impl Into<String>) -> FieldDef {
        self.oneof = Some(name.into());
        self
    }

    /// The full name of the message an extension extends.
    pub fn extendee(mut self, name: impl Into<String>) -> FieldDef {
        self.extendee = Some(name.into());
        self
    }
}

/// The definition of a message type.
#[derive(Clone, Debug)]
pub struct MessageDef {
    full_name: String,
    fields: Vec<FieldDef>,
    extension_ranges: Vec<Range<u32>>,
    message_set_wire_format: bool,
}

impl MessageDef {
    pub fn new(full_name: impl Into<String>) -> MessageDef {
        MessageDef {
            full_name: full_name.into(),
            fields: Vec::new(),
            extension_ranges: Vec::new(),
            message_set_wire_format: false,
        }
    }

    pub fn field(mut self, field: FieldDef) -> MessageDef {
        self.fields.push(field);
        self
    }

    /// Reserves the field numbers in `range` (end exclusive) for extensions.
    pub fn extension_range(mut self, range: Range<u32>) -> MessageDef {
        self.extension_ranges.push(range);
        self
    }

    /// Serializes the message's extensions in the MessageSet wire format.
    pub fn message_set_wire_format(mut self) -> MessageDef {
        self.message_set_wire_format = true;
        self
    }
}

/// The definition of an enum type. The first value is the default.
#[derive(Clone, Debug)]
pub struct EnumDef {
    full_name: String,
    values: Vec<(String, i32)>,
}

impl EnumDef {
    pub fn new(full_name: impl Into<String>) -> EnumDef {
        EnumDef {
            full_name: full_name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i32) -> EnumDef {
        self.values.push((name.into(), number));
        self
    }
}

#[derive(Debug)]
struct FieldInner {
    name: String,
    full_name: String,
    number: u32,
    kind: KindIndex,
    cardinality: Cardinality,
    packed: bool,
    implicit_presence: bool,
    default_value: Option<Value>,
    /// Index of the message the field is declared in, or the extendee of an extension.
    containing: usize,
    oneof: Option<usize>,
    is_extension: bool,
}

#[derive(Debug)]
struct OneofInner {
    name: String,
    full_name: String,
    fields: Vec<usize>,
}

#[derive(Debug)]
struct MessageInner {
    full_name: String,
    /// Sorted by field number.
    fields: Vec<FieldInner>,
    field_names: BTreeMap<String, usize>,
    oneofs: Vec<OneofInner>,
    extension_ranges: Vec<Range<u32>>,
    message_set_wire_format: bool,
    /// Pool extension indices extending this message.
    extensions: Vec<usize>,
}

#[derive(Debug)]
struct EnumInner {
    full_name: String,
    values: Vec<(String, i32)>,
}

#[derive(Clone, Copy, Debug)]
enum Definition {
    Message(usize),
    Enum(usize),
    Extension(usize),
}

#[derive(Debug)]
struct PoolInner {
    messages: Vec<MessageInner>,
    enums: Vec<EnumInner>,
    extensions: Vec<FieldInner>,
    names: BTreeMap<String, Definition>,
}

/// A resolved, immutable set of message, enum and extension definitions.
#[derive(Clone)]
pub struct DescriptorPool {
    inner: Arc<PoolInner>,
}

/// Collects definitions for [`DescriptorPool`].
#[derive(Clone, Debug, Default)]
pub struct DescriptorPoolBuilder {
    messages: Vec<MessageDef>,
    enums: Vec<EnumDef>,
    extensions: Vec<FieldDef>,
}

impl DescriptorPoolBuilder {
    pub fn message(mut self, message: MessageDef) -> DescriptorPoolBuilder {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumDef) -> DescriptorPoolBuilder {
        self.enums.push(enumeration);
        self
    }

    /// Registers an extension field. The definition must name its extendee.
    pub fn extension(mut self, extension: FieldDef) -> DescriptorPoolBuilder {
        self.extensions.push(extension);
        self
    }

    /// Resolves all type references and builds the pool.
    ///
    /// Fails only if a type name or extendee names no definition in the pool. Field numbers,
    /// names and defaults are taken as given.
    pub fn build(self) -> Result<DescriptorPool, DescriptorError> {
        let mut names = BTreeMap::new();
        for (index, message) in self.messages.iter().enumerate() {
            names.insert(strip_dot(&message.full_name).to_owned(), Definition::Message(index));
        }
        for (index, enumeration) in self.enums.iter().enumerate() {
            names.insert(strip_dot(&enumeration.full_name).to_owned(), Definition::Enum(index));
        }
        for (index, extension) in self.extensions.iter().enumerate() {
            names.insert(strip_dot(&extension.name).to_owned(), Definition::Extension(index));
        }

        let enums: Vec<EnumInner> = self
            .enums
            .into_iter()
            .map(|def| EnumInner {
                full_name: strip_dot(&def.full_name).to_owned(),
                values: def.values,
            })
            .collect();

        let mut messages = Vec::with_capacity(self.messages.len());
        for (index, def) in self.messages.into_iter().enumerate() {
            messages.push(resolve_message(index, def, &names)?);
        }

        let mut extensions = Vec::with_capacity(self.extensions.len());
        for (index, def) in self.extensions.into_iter().enumerate() {
            let extendee = match def.extendee.as_deref().map(|name| names.get(strip_dot(name))) {
                Some(Some(&Definition::Message(extendee))) => extendee,
                _ => {
                    return Err(DescriptorError::new(format!(
                        "extension {} does not extend a message in the pool",
                        def.name
                    )))
                }
            };
            messages[extendee].extensions.push(index);

            let full_name = strip_dot(&def.name).to_owned();
            let field = resolve_field(def, full_name, extendee, &names)?;
            extensions.push(FieldInner {
                is_extension: true,
                ..field
            });
        }

        log::trace!(
            "built descriptor pool: {} messages, {} enums, {} extensions",
            messages.len(),
            enums.len(),
            extensions.len()
        );

        Ok(DescriptorPool {
            inner: Arc::new(PoolInner {
                messages,
                enums,
                extensions,
                names,
            }),
        })
    }
}

fn strip_dot(name: &str) -> &str {
    name.strip_prefix('.').unwrap_or(name)
}

fn resolve_message(
    index: usize,
    def: MessageDef,
    names: &BTreeMap<String, Definition>,
) -> Result<MessageInner, DescriptorError> {
    let full_name = strip_dot(&def.full_name).to_owned();
    let mut defs = def.fields;
    defs.sort_by_key(|field| field.number);

    let mut fields: Vec<FieldInner> = Vec::with_capacity(defs.len());
    let mut field_names = BTreeMap::new();
    let mut oneofs: Vec<OneofInner> = Vec::new();
    for field in defs {
        let field_index = fields.len();
        field_names.insert(field.name.clone(), field_index);

        let oneof = match &field.oneof {
            Some(name) => {
                let position = match oneofs.iter().position(|oneof| &oneof.name == name) {
                    Some(position) => position,
                    None => {
                        oneofs.push(OneofInner {
                            name: name.clone(),
                            full_name: format!("{full_name}.{name}"),
                            fields: Vec::new(),
                        });
                        oneofs.len() - 1
                    }
                };
                oneofs[position].fields.push(field_index);
                Some(position)
            }
            None => None,
        };

        let field_full_name = format!("{full_name}.{}", field.name);
        let resolved = resolve_field(field, field_full_name, index, names)?;
        fields.push(FieldInner { oneof, ..resolved });
    }

    Ok(MessageInner {
        full_name,
        fields,
        field_names,
        oneofs,
        extension_ranges: def.extension_ranges,
        message_set_wire_format: def.message_set_wire_format,
        extensions: Vec::new(),
    })
}

fn resolve_field(
    def: FieldDef,
    full_name: String,
    containing: usize,
    names: &BTreeMap<String, Definition>,
) -> Result<FieldInner, DescriptorError> {
    let lookup = || {
        def.type_name
            .as_deref()
            .and_then(|name| names.get(strip_dot(name)).copied())
    };
    let kind = match def.ty {
        Type::Double => KindIndex::Double,
        Type::Float => KindIndex::Float,
        Type::Int64 => KindIndex::Int64,
        Type::Uint64 => KindIndex::Uint64,
        Type::Int32 => KindIndex::Int32,
        Type::Fixed64 => KindIndex::Fixed64,
        Type::Fixed32 => KindIndex::Fixed32,
        Type::Bool => KindIndex::Bool,
        Type::String => KindIndex::String,
        Type::Bytes => KindIndex::Bytes,
        Type::Uint32 => KindIndex::Uint32,
        Type::Sfixed32 => KindIndex::Sfixed32,
        Type::Sfixed64 => KindIndex::Sfixed64,
        Type::Sint32 => KindIndex::Sint32,
        Type::Sint64 => KindIndex::Sint64,
        Type::Message | Type::Group => match lookup() {
            Some(Definition::Message(index)) if def.ty == Type::Message => {
                KindIndex::Message(index)
            }
            Some(Definition::Message(index)) => KindIndex::Group(index),
            _ => {
                return Err(DescriptorError::new(format!(
                    "{full_name} refers to unknown message type {:?}",
                    def.type_name
                )))
            }
        },
        Type::Enum => match lookup() {
            Some(Definition::Enum(index)) => KindIndex::Enum(index),
            _ => {
                return Err(DescriptorError::new(format!(
                    "{full_name} refers to unknown enum type {:?}",
                    def.type_name
                )))
            }
        },
    };

    let name = match full_name.rfind('.') {
        Some(dot) => full_name[dot + 1..].to_owned(),
        None => full_name.clone(),
    };
    Ok(FieldInner {
        name,
        full_name,
        number: def.number,
        kind,
        cardinality: def.cardinality,
        packed: def.packed,
        implicit_presence: def.implicit_presence,
        default_value: def.default_value,
        containing,
        oneof: None,
        is_extension: false,
    })
}

impl DescriptorPool {
    pub fn builder() -> DescriptorPoolBuilder {
        DescriptorPoolBuilder::default()
    }

    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        match self.inner.names.get(strip_dot(name)) {
            Some(&Definition::Message(index)) => Some(MessageDescriptor {
                pool: self.clone(),
                index,
            }),
            _ => None,
        }
    }

    pub fn get_enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        match self.inner.names.get(strip_dot(name)) {
            Some(&Definition::Enum(index)) => Some(EnumDescriptor {
                pool: self.clone(),
                index,
            }),
            _ => None,
        }
    }

    pub fn get_extension_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        match self.inner.names.get(strip_dot(name)) {
            Some(&Definition::Extension(index)) => Some(FieldDescriptor {
                pool: self.clone(),
                index: FieldIndex::Extension(index),
            }),
            _ => None,
        }
    }

    pub fn all_extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.inner.extensions.len()).map(|index| FieldDescriptor {
            pool: self.clone(),
            index: FieldIndex::Extension(index),
        })
    }
}

impl PartialEq for DescriptorPool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DescriptorPool {}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("messages", &self.inner.messages.len())
            .field("enums", &self.inner.enums.len())
            .field("extensions", &self.inner.extensions.len())
            .finish()
    }
}

/// A handle to a message type in a [`DescriptorPool`].
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl MessageDescriptor {
    fn inner(&self) -> &MessageInner {
        &self.pool.inner.messages[self.index]
    }

    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// A key equal for two handles exactly when the handles are equal. Stable while the pool
    /// is alive.
    pub(crate) fn identity(&self) -> (usize, usize) {
        (Arc::as_ptr(&self.pool.inner) as usize, self.index)
    }

    /// The unqualified name.
    pub fn name(&self) -> &str {
        let full_name = self.full_name();
        full_name.rsplit('.').next().unwrap_or(full_name)
    }

    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Declared fields in ascending field-number order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.inner().fields.len()).map(move |field| FieldDescriptor {
            pool: self.pool.clone(),
            index: FieldIndex::Field {
                message: self.index,
                field,
            },
        })
    }

    /// Looks up a declared field by number. Extensions are found through an
    /// [`ExtensionRegistry`](crate::ExtensionRegistry).
    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        let field = self
            .inner()
            .fields
            .binary_search_by_key(&number, |field| field.number)
            .ok()?;
        Some(FieldDescriptor {
            pool: self.pool.clone(),
            index: FieldIndex::Field {
                message: self.index,
                field,
            },
        })
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let field = *self.inner().field_names.get(name)?;
        Some(FieldDescriptor {
            pool: self.pool.clone(),
            index: FieldIndex::Field {
                message: self.index,
                field,
            },
        })
    }

    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = OneofDescriptor> + '_ {
        (0..self.inner().oneofs.len()).map(move |index| OneofDescriptor {
            pool: self.pool.clone(),
            message: self.index,
            index,
        })
    }

    pub fn extension_ranges(&self) -> &[Range<u32>] {
        &self.inner().extension_ranges
    }

    /// Returns `true` if `number` falls in one of the message's extension ranges.
    pub fn is_extension_number(&self, number: u32) -> bool {
        self.inner()
            .extension_ranges
            .iter()
            .any(|range| range.contains(&number))
    }

    /// Returns `true` if the message uses the MessageSet wire format.
    pub fn is_message_set(&self) -> bool {
        self.inner().message_set_wire_format
    }

    /// Extensions in the pool that extend this message.
    pub fn extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .extensions
            .iter()
            .map(move |&index| FieldDescriptor {
                pool: self.pool.clone(),
                index: FieldIndex::Extension(index),
            })
    }
}

impl Hash for MessageDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FieldIndex {
    Field { message: usize, field: usize },
    Extension(usize),
}

/// A handle to a declared field or an extension.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pool: DescriptorPool,
    index: FieldIndex,
}

impl FieldDescriptor {
    fn inner(&self) -> &FieldInner {
        match self.index {
            FieldIndex::Field { message, field } => &self.pool.inner.messages[message].fields[field],
            FieldIndex::Extension(index) => &self.pool.inner.extensions[index],
        }
    }

    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// `message.field` for declared fields, the registered name for extensions.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    pub fn number(&self) -> u32 {
        self.inner().number
    }

    pub fn kind(&self) -> Kind {
        let pool = &self.pool;
        match self.inner().kind {
            KindIndex::Double => Kind::Double,
            KindIndex::Float => Kind::Float,
            KindIndex::Int64 => Kind::Int64,
            KindIndex::Uint64 => Kind::Uint64,
            KindIndex::Int32 => Kind::Int32,
            KindIndex::Fixed64 => Kind::Fixed64,
            KindIndex::Fixed32 => Kind::Fixed32,
            KindIndex::Bool => Kind::Bool,
            KindIndex::String => Kind::String,
            KindIndex::Bytes => Kind::Bytes,
            KindIndex::Uint32 => Kind::Uint32,
            KindIndex::Sfixed32 => Kind::Sfixed32,
            KindIndex::Sfixed64 => Kind::Sfixed64,
            KindIndex::Sint32 => Kind::Sint32,
            KindIndex::Sint64 => Kind::Sint64,
            KindIndex::Enum(index) => Kind::Enum(EnumDescriptor {
                pool: pool.clone(),
                index,
            }),
            KindIndex::Message(index) => Kind::Message(MessageDescriptor {
                pool: pool.clone(),
                index,
            }),
            KindIndex::Group(index) => Kind::Group(MessageDescriptor {
                pool: pool.clone(),
                index,
            }),
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    pub fn is_repeated(&self) -> bool {
        self.inner().cardinality == Cardinality::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.inner().cardinality == Cardinality::Required
    }

    /// Returns `true` if the field is written in packed form. Only packable fields are.
    pub fn is_packed(&self) -> bool {
        self.inner().packed && self.is_packable()
    }

    /// Returns `true` for packable repeated fields, which accept both packed and unpacked
    /// input regardless of how they are written.
    pub fn is_packable(&self) -> bool {
        self.is_repeated() && self.inner().kind.is_packable()
    }

    pub fn is_extension(&self) -> bool {
        self.inner().is_extension
    }

    /// Returns `true` for message- or group-typed fields.
    pub fn is_message(&self) -> bool {
        self.inner().kind.is_message()
    }

    /// Returns `true` if a singular field tracks whether it has been set.
    pub fn supports_presence(&self) -> bool {
        !self.is_repeated() && !self.inner().implicit_presence
    }

    /// The message the field is declared in, or the message an extension extends.
    pub fn containing_message(&self) -> MessageDescriptor {
        MessageDescriptor {
            pool: self.pool.clone(),
            index: self.inner().containing,
        }
    }

    pub fn containing_oneof(&self) -> Option<OneofDescriptor> {
        let index = self.inner().oneof?;
        Some(OneofDescriptor {
            pool: self.pool.clone(),
            message: self.inner().containing,
            index,
        })
    }

    /// The explicit default of a singular scalar field, if one was defined.
    pub(crate) fn explicit_default(&self) -> Option<&Value> {
        self.inner().default_value.as_ref()
    }

    /// The value [`get_field`](crate::DynamicMessage::get_field) reports when the field is
    /// unset: the explicit default, the kind's zero value, the enum's first value, the message
    /// type's empty instance, or an empty list for repeated fields.
    pub fn default_value(&self) -> Value {
        Value::default_for_field(self)
    }
}

impl Hash for FieldDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.full_name())
            .field("number", &self.number())
            .field("kind", &self.kind())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

/// A handle to an enum type.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl EnumDescriptor {
    fn inner(&self) -> &EnumInner {
        &self.pool.inner.enums[self.index]
    }

    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// `(name, number)` pairs in definition order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = (&str, i32)> + '_ {
        self.inner()
            .values
            .iter()
            .map(|(name, number)| (name.as_str(), *number))
    }

    /// The first defined value, or 0 for an enum with no values.
    pub fn default_value(&self) -> i32 {
        self.inner().values.first().map_or(0, |&(_, number)| number)
    }

    /// Returns the name of the value numbered `number`, if it is defined.
    pub fn get_value(&self, number: i32) -> Option<&str> {
        self.values()
            .find(|&(_, value)| value == number)
            .map(|(name, _)| name)
    }

    pub fn get_value_by_name(&self, name: &str) -> Option<i32> {
        self.values()
            .find(|&(value_name, _)| value_name == name)
            .map(|(_, number)| number)
    }
}

impl Hash for EnumDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

/// A handle to a oneof: a set of fields of which at most one is set.
#[derive(Clone, PartialEq, Eq)]
pub struct OneofDescriptor {
    pool: DescriptorPool,
    message: usize,
    index: usize,
}

impl OneofDescriptor {
    fn inner(&self) -> &OneofInner {
        &self.pool.inner.messages[self.message].oneofs[self.index]
    }

    pub fn name(&self) -> &str {
        &self.inner().name
    }

    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    pub fn containing_message(&self) -> MessageDescriptor {
        MessageDescriptor {
            pool: self.pool.clone(),
            index: self.message,
        }
    }

    /// Member fields in ascending field-number order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner().fields.iter().map(move |&field| FieldDescriptor {
            pool: self.pool.clone(),
            index: FieldIndex::Field {
                message: self.message,
                field,
            },
        })
    }
}

impl Hash for OneofDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneofDescriptor")
            .field(&self.full_name())
            .finish()
    }
}
