//! Dynamically typed field values.

use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use ::bytes::BufMut;

use crate::bytestring::ByteString;
use crate::descriptor::{FieldDescriptor, Kind};
use crate::encoding::encoded_len_varint;
use crate::error::DecodeError;
use crate::message::DynamicMessage;
use crate::reader::CodedReader;
use crate::writer::CodedWriter;

/// The value of a field.
///
/// Each [`Kind`] accepts exactly one variant: `Int32`, `Sint32` and `Sfixed32` take
/// [`I32`](Value::I32), `Fixed32` and `Uint32` take [`U32`](Value::U32), and so on. Repeated
/// fields hold a [`List`](Value::List) of such values.
///
/// Floating-point values compare and hash by bit pattern, so `NaN` equals itself and `0.0`
/// differs from `-0.0`.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(ByteString),
    /// An enum value by number. Only numbers the enum defines may be stored in a field.
    EnumNumber(i32),
    Message(DynamicMessage),
    List(Vec<Value>),
}

impl Value {
    /// The zero value of a kind; the empty instance for message kinds and the first value for
    /// enums.
    pub fn default_for_kind(kind: &Kind) -> Value {
        match kind {
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Bytes => Value::Bytes(ByteString::new()),
            Kind::Enum(desc) => Value::EnumNumber(desc.default_value()),
            Kind::Message(desc) | Kind::Group(desc) => {
                Value::Message(DynamicMessage::new(desc.clone()))
            }
        }
    }

    /// The value an unset field reports.
    pub fn default_for_field(field: &FieldDescriptor) -> Value {
        if field.is_repeated() {
            return Value::List(Vec::new());
        }
        match field.explicit_default() {
            Some(value) => value.clone(),
            None => Value::default_for_kind(&field.kind()),
        }
    }

    /// Returns `true` if `self` may be stored in `field`.
    pub fn is_valid_for_field(&self, field: &FieldDescriptor) -> bool {
        let kind = field.kind();
        match (self, field.is_repeated()) {
            (Value::List(values), true) => values.iter().all(|value| value.is_valid(&kind)),
            (_, true) | (Value::List(_), false) => false,
            (value, false) => value.is_valid(&kind),
        }
    }

    /// Returns `true` if `self` is a single value of `kind`.
    pub fn is_valid(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::F64(_), Kind::Double) | (Value::F32(_), Kind::Float) => true,
            (Value::I32(_), Kind::Int32 | Kind::Sint32 | Kind::Sfixed32) => true,
            (Value::I64(_), Kind::Int64 | Kind::Sint64 | Kind::Sfixed64) => true,
            (Value::U32(_), Kind::Uint32 | Kind::Fixed32) => true,
            (Value::U64(_), Kind::Uint64 | Kind::Fixed64) => true,
            (Value::Bool(_), Kind::Bool) => true,
            (Value::String(_), Kind::String) | (Value::Bytes(_), Kind::Bytes) => true,
            (Value::EnumNumber(number), Kind::Enum(desc)) => desc.get_value(*number).is_some(),
            (Value::Message(message), Kind::Message(desc) | Kind::Group(desc)) => {
                message.descriptor() == desc
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&ByteString> {
        match self {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            Value::EnumNumber(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Encoded length of a single scalar value without its tag. Length-delimited kinds include
    /// their length prefix.
    pub(crate) fn scalar_encoded_len(&self, kind: &Kind) -> usize {
        match (self, kind) {
            (Value::F64(_), _) | (Value::U64(_), Kind::Fixed64) | (Value::I64(_), Kind::Sfixed64) => 8,
            (Value::F32(_), _) | (Value::U32(_), Kind::Fixed32) | (Value::I32(_), Kind::Sfixed32) => 4,
            (Value::I32(value), Kind::Sint32) => {
                encoded_len_varint(u64::from(crate::encoding::encode_zigzag32(*value)))
            }
            (Value::I64(value), Kind::Sint64) => {
                encoded_len_varint(crate::encoding::encode_zigzag64(*value))
            }
            (Value::I32(value), _) | (Value::EnumNumber(value), _) => {
                encoded_len_varint(*value as i64 as u64)
            }
            (Value::I64(value), _) => encoded_len_varint(*value as u64),
            (Value::U32(value), _) => encoded_len_varint(u64::from(*value)),
            (Value::U64(value), _) => encoded_len_varint(*value),
            (Value::Bool(_), _) => 1,
            (Value::String(value), _) => encoded_len_varint(value.len() as u64) + value.len(),
            (Value::Bytes(value), _) => encoded_len_varint(value.len() as u64) + value.len(),
            (Value::Message(_) | Value::List(_), _) => {
                panic!("{self:?} is not a scalar value of kind {kind:?}")
            }
        }
    }

    /// Writes a single scalar value without its tag.
    pub(crate) fn write_scalar<B: BufMut>(&self, kind: &Kind, writer: &mut CodedWriter<B>) {
        match (self, kind) {
            (Value::F64(value), _) => writer.write_double(*value),
            (Value::F32(value), _) => writer.write_float(*value),
            (Value::I32(value), Kind::Sint32) => writer.write_sint32(*value),
            (Value::I32(value), Kind::Sfixed32) => writer.write_sfixed32(*value),
            (Value::I32(value), _) => writer.write_int32(*value),
            (Value::I64(value), Kind::Sint64) => writer.write_sint64(*value),
            (Value::I64(value), Kind::Sfixed64) => writer.write_sfixed64(*value),
            (Value::I64(value), _) => writer.write_int64(*value),
            (Value::U32(value), Kind::Fixed32) => writer.write_fixed32(*value),
            (Value::U32(value), _) => writer.write_uint32(*value),
            (Value::U64(value), Kind::Fixed64) => writer.write_fixed64(*value),
            (Value::U64(value), _) => writer.write_uint64(*value),
            (Value::Bool(value), _) => writer.write_bool(*value),
            (Value::EnumNumber(value), _) => writer.write_enum(*value),
            (Value::String(value), _) => writer.write_length_delimited(value.as_bytes()),
            (Value::Bytes(value), _) => writer.write_length_delimited(value.as_slice()),
            (Value::Message(_) | Value::List(_), _) => {
                panic!("{self:?} is not a scalar value of kind {kind:?}")
            }
        }
    }

    /// Reads a single scalar value of `kind`. Enum numbers are returned as read, defined or
    /// not.
    pub(crate) fn read_scalar(kind: &Kind, reader: &mut CodedReader<'_>) -> Result<Value, DecodeError> {
        Ok(match kind {
            Kind::Double => Value::F64(reader.read_double()?),
            Kind::Float => Value::F32(reader.read_float()?),
            Kind::Int64 => Value::I64(reader.read_int64()?),
            Kind::Uint64 => Value::U64(reader.read_uint64()?),
            Kind::Int32 => Value::I32(reader.read_int32()?),
            Kind::Fixed64 => Value::U64(reader.read_fixed64()?),
            Kind::Fixed32 => Value::U32(reader.read_fixed32()?),
            Kind::Bool => Value::Bool(reader.read_bool()?),
            Kind::String => Value::String(reader.read_string()?),
            Kind::Bytes => Value::Bytes(reader.read_bytes()?),
            Kind::Uint32 => Value::U32(reader.read_uint32()?),
            Kind::Sfixed32 => Value::I32(reader.read_sfixed32()?),
            Kind::Sfixed64 => Value::I64(reader.read_sfixed64()?),
            Kind::Sint32 => Value::I32(reader.read_sint32()?),
            Kind::Sint64 => Value::I64(reader.read_sint64()?),
            Kind::Enum(_) => Value::EnumNumber(reader.read_enum()?),
            Kind::Message(desc) | Kind::Group(desc) => {
                panic!("message type {} is not a scalar kind", desc.full_name())
            }
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::EnumNumber(a), Value::EnumNumber(b)) => a == b,
            (Value::Message(a), Value::Message(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(value) => value.hash(state),
            Value::I32(value) | Value::EnumNumber(value) => value.hash(state),
            Value::I64(value) => value.hash(state),
            Value::U32(value) => value.hash(state),
            Value::U64(value) => value.hash(state),
            Value::F32(value) => value.to_bits().hash(state),
            Value::F64(value) => value.to_bits().hash(state),
            Value::String(value) => value.hash(state),
            Value::Bytes(value) => value.hash(state),
            Value::Message(value) => value.hash(state),
            Value::List(values) => values.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::I64(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Value {
        Value::U32(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Value {
        Value::U64(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Value {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.into())
    }
}

impl From<ByteString> for Value {
    fn from(value: ByteString) -> Value {
        Value::Bytes(value)
    }
}

impl From<DynamicMessage> for Value {
    fn from(value: DynamicMessage) -> Value {
        Value::Message(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Value {
        Value::List(values)
    }
}
