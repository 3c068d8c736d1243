//! Storage for the set fields of a message, declared and extension alike.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use ::bytes::BufMut;

use crate::descriptor::{FieldDescriptor, Kind, MessageDescriptor};
use crate::encoding::{encoded_len_varint, key_len, WireType};
use crate::message::Encode;
use crate::unknown::{message_set_item_encoded_len, write_message_set_item_header};
use crate::value::Value;
use crate::writer::CodedWriter;

/// Field values keyed by field number.
///
/// Every observable walk (serialization, equality, hashing, initialization checks) goes in
/// ascending field-number order. Declared fields and extensions share the map; they cannot
/// collide because declared numbers lie outside the extension ranges.
///
/// The set stores whatever it is given. Callers check values against their field with
/// [`Value::is_valid_for_field`] first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct FieldSet {
    fields: BTreeMap<u32, (FieldDescriptor, Value)>,
}

impl FieldSet {
    pub(crate) const fn new() -> FieldSet {
        FieldSet {
            fields: BTreeMap::new(),
        }
    }

    /// Set fields and their values in field-number order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.fields.values().map(|(field, value)| (field, value))
    }

    pub(crate) fn get(&self, field: &FieldDescriptor) -> Option<&Value> {
        match self.fields.get(&field.number()) {
            Some((stored, value)) if stored == field => Some(value),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, field: &FieldDescriptor) -> Option<&mut Value> {
        match self.fields.get_mut(&field.number()) {
            Some((stored, value)) if stored == field => Some(value),
            _ => None,
        }
    }

    /// Repeated fields count as set while non-empty.
    pub(crate) fn has(&self, field: &FieldDescriptor) -> bool {
        match self.get(field) {
            Some(Value::List(values)) => !values.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// Stores `value`, clearing the other members of the field's oneof.
    ///
    /// An empty list, or the default of a field without presence, clears the field instead.
    pub(crate) fn set(&mut self, field: FieldDescriptor, value: Value) {
        if let Some(oneof) = field.containing_oneof() {
            for member in oneof.fields() {
                if member != field {
                    self.fields.remove(&member.number());
                }
            }
        }

        let clears = match &value {
            Value::List(values) => values.is_empty(),
            value => !field.supports_presence() && *value == field.default_value(),
        };
        if clears {
            self.fields.remove(&field.number());
        } else {
            self.fields.insert(field.number(), (field, value));
        }
    }

    /// The list of a repeated field, created empty if absent.
    pub(crate) fn list_mut(&mut self, field: &FieldDescriptor) -> &mut Vec<Value> {
        let (_, value) = self
            .fields
            .entry(field.number())
            .or_insert_with(|| (field.clone(), Value::List(Vec::new())));
        match value {
            Value::List(values) => values,
            other => panic!("{} holds {other:?} rather than a list", field.full_name()),
        }
    }

    /// Removes and returns the value of `field`.
    pub(crate) fn take(&mut self, field: &FieldDescriptor) -> Option<Value> {
        match self.fields.get(&field.number()) {
            Some((stored, _)) if stored == field => {
                self.fields.remove(&field.number()).map(|(_, value)| value)
            }
            _ => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.fields.clear();
    }

    /// Merges `other` into `self`: singular scalars overwrite, singular messages merge
    /// recursively (or are adopted when unset), lists concatenate.
    pub(crate) fn merge_from(&mut self, other: &FieldSet) {
        for (field, value) in other.iter() {
            match value {
                Value::List(values) => self.list_mut(field).extend(values.iter().cloned()),
                Value::Message(message) => match self.get_mut(field) {
                    Some(Value::Message(existing)) => existing.merge_in_place(message),
                    _ => self.set(field.clone(), value.clone()),
                },
                _ => self.set(field.clone(), value.clone()),
            }
        }
    }

    pub(crate) fn encoded_len(&self, message_set: bool) -> usize {
        self.iter()
            .map(|(field, value)| match value {
                Value::Message(message) if message_set && is_message_set_item(field) => {
                    message_set_item_encoded_len(field.number(), message.encoded_len())
                }
                _ => field_encoded_len(field, value),
            })
            .sum()
    }

    pub(crate) fn write_to<B: BufMut>(&self, writer: &mut CodedWriter<B>, message_set: bool) {
        for (field, value) in self.iter() {
            match value {
                Value::Message(message) if message_set && is_message_set_item(field) => {
                    write_message_set_item_header(field.number(), message.encoded_len(), writer);
                    message.write_to(writer);
                    writer.write_tag(crate::encoding::MESSAGE_SET_ITEM, WireType::EndGroup);
                }
                _ => write_field(field, value, writer),
            }
        }
    }

    /// Returns `true` if every required field of `desc` is set and every set message value is
    /// itself initialized.
    pub(crate) fn is_initialized(&self, desc: &MessageDescriptor) -> bool {
        if desc
            .fields()
            .any(|field| field.is_required() && !self.has(&field))
        {
            return false;
        }
        self.iter().all(|(_, value)| match value {
            Value::Message(message) => message.is_initialized(),
            Value::List(values) => values.iter().all(|value| match value {
                Value::Message(message) => message.is_initialized(),
                _ => true,
            }),
            _ => true,
        })
    }

    /// Appends the path of every missing required field to `out`, each prefixed with `prefix`.
    pub(crate) fn find_initialization_errors(
        &self,
        desc: &MessageDescriptor,
        prefix: &str,
        out: &mut Vec<String>,
    ) {
        for field in desc.fields() {
            if field.is_required() && !self.has(&field) {
                out.push(format!("{prefix}{}", field.name()));
            }
        }

        for (field, value) in self.iter() {
            match value {
                Value::Message(message) => {
                    let prefix = sub_message_prefix(prefix, field, None);
                    message.find_initialization_errors_into(&prefix, out);
                }
                Value::List(values) => {
                    for (index, value) in values.iter().enumerate() {
                        if let Value::Message(message) = value {
                            let prefix = sub_message_prefix(prefix, field, Some(index));
                            message.find_initialization_errors_into(&prefix, out);
                        }
                    }
                }
                _ => (),
            }
        }
    }
}

/// `prefix` followed by the field name, `(full.name)` for extensions, then `[index]` for list
/// elements and a trailing dot.
fn sub_message_prefix(prefix: &str, field: &FieldDescriptor, index: Option<usize>) -> String {
    let mut path = String::from(prefix);
    if field.is_extension() {
        path.push('(');
        path.push_str(field.full_name());
        path.push(')');
    } else {
        path.push_str(field.name());
    }
    if let Some(index) = index {
        path.push_str(&format!("[{index}]"));
    }
    path.push('.');
    path
}

/// Singular message extensions of a MessageSet are written as items.
fn is_message_set_item(field: &FieldDescriptor) -> bool {
    field.is_extension() && !field.is_repeated() && matches!(field.kind(), Kind::Message(_))
}

fn field_encoded_len(field: &FieldDescriptor, value: &Value) -> usize {
    let kind = field.kind();
    let number = field.number();
    match value {
        Value::List(values) if field.is_packed() => {
            if values.is_empty() {
                return 0;
            }
            let len = packed_data_len(&kind, values);
            key_len(number) + encoded_len_varint(len as u64) + len
        }
        Value::List(values) => values
            .iter()
            .map(|value| single_encoded_len(number, &kind, value))
            .sum(),
        value => single_encoded_len(number, &kind, value),
    }
}

fn packed_data_len(kind: &Kind, values: &[Value]) -> usize {
    values.iter().map(|value| value.scalar_encoded_len(kind)).sum()
}

fn single_encoded_len(number: u32, kind: &Kind, value: &Value) -> usize {
    match (kind, value) {
        (Kind::Message(_), Value::Message(message)) => {
            let len = message.encoded_len();
            key_len(number) + encoded_len_varint(len as u64) + len
        }
        (Kind::Group(_), Value::Message(message)) => 2 * key_len(number) + message.encoded_len(),
        _ => key_len(number) + value.scalar_encoded_len(kind),
    }
}

fn write_field<B: BufMut>(field: &FieldDescriptor, value: &Value, writer: &mut CodedWriter<B>) {
    let kind = field.kind();
    let number = field.number();
    match value {
        Value::List(values) if field.is_packed() => {
            if values.is_empty() {
                return;
            }
            writer.write_tag(number, WireType::LengthDelimited);
            writer.write_varint(packed_data_len(&kind, values) as u64);
            for value in values {
                value.write_scalar(&kind, writer);
            }
        }
        Value::List(values) => {
            for value in values {
                write_single(number, &kind, value, writer);
            }
        }
        value => write_single(number, &kind, value, writer),
    }
}

fn write_single<B: BufMut>(number: u32, kind: &Kind, value: &Value, writer: &mut CodedWriter<B>) {
    match (kind, value) {
        (Kind::Message(_), Value::Message(message)) => {
            writer.write_tag(number, WireType::LengthDelimited);
            writer.write_varint(message.encoded_len() as u64);
            message.write_to(writer);
        }
        (Kind::Group(_), Value::Message(message)) => {
            writer.write_tag(number, WireType::StartGroup);
            message.write_to(writer);
            writer.write_tag(number, WireType::EndGroup);
        }
        _ => {
            writer.write_tag(number, kind.wire_type());
            value.write_scalar(kind, writer);
        }
    }
}
