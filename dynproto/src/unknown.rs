//! Fields a parser did not recognize, kept for re-serialization.

use alloc::collections::btree_map;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use ::bytes::BufMut;

use crate::bytestring::ByteString;
use crate::encoding::{
    encoded_len_varint, key_len, tag_field_number, tag_wire_type, WireType, MESSAGE_SET_ITEM,
    MESSAGE_SET_MESSAGE, MESSAGE_SET_TYPE_ID,
};
use crate::error::DecodeError;
use crate::reader::CodedReader;
use crate::writer::CodedWriter;

/// A single raw value, tagged by the wire type it was read with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnknownValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(ByteString),
    Group(UnknownFieldSet),
    Fixed32(u32),
}

impl UnknownValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            UnknownValue::Varint(_) => WireType::Varint,
            UnknownValue::Fixed64(_) => WireType::SixtyFourBit,
            UnknownValue::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownValue::Group(_) => WireType::StartGroup,
            UnknownValue::Fixed32(_) => WireType::ThirtyTwoBit,
        }
    }

    fn encoded_len(&self, number: u32) -> usize {
        match self {
            UnknownValue::Varint(value) => key_len(number) + encoded_len_varint(*value),
            UnknownValue::Fixed64(_) => key_len(number) + 8,
            UnknownValue::LengthDelimited(data) => {
                key_len(number) + encoded_len_varint(data.len() as u64) + data.len()
            }
            UnknownValue::Group(group) => 2 * key_len(number) + group.encoded_len(),
            UnknownValue::Fixed32(_) => key_len(number) + 4,
        }
    }

    fn write_to<B: BufMut>(&self, number: u32, writer: &mut CodedWriter<B>) {
        writer.write_tag(number, self.wire_type());
        match self {
            UnknownValue::Varint(value) => writer.write_varint(*value),
            UnknownValue::Fixed64(value) => writer.write_fixed64(*value),
            UnknownValue::LengthDelimited(data) => writer.write_length_delimited(data.as_slice()),
            UnknownValue::Group(group) => {
                group.write_to(writer);
                writer.write_tag(number, WireType::EndGroup);
            }
            UnknownValue::Fixed32(value) => writer.write_fixed32(*value),
        }
    }
}

/// Unrecognized fields by number.
///
/// Values of one field number stay in the order they were added, whatever their wire types,
/// and are written back that way, so an unknown field re-serializes byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnknownFieldSet {
    fields: BTreeMap<u32, Vec<UnknownValue>>,
}

impl UnknownFieldSet {
    pub const fn new() -> UnknownFieldSet {
        UnknownFieldSet {
            fields: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of distinct field numbers.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn has_field(&self, number: u32) -> bool {
        self.fields.contains_key(&number)
    }

    /// The values recorded for `number`, in encounter order.
    pub fn get(&self, number: u32) -> &[UnknownValue] {
        self.fields.get(&number).map_or(&[], Vec::as_slice)
    }

    /// Iterates over field numbers in ascending order.
    pub fn iter(&self) -> btree_map::Iter<'_, u32, Vec<UnknownValue>> {
        self.fields.iter()
    }

    pub fn add(&mut self, number: u32, value: UnknownValue) {
        self.fields.entry(number).or_default().push(value);
    }

    pub fn add_varint(&mut self, number: u32, value: u64) {
        self.add(number, UnknownValue::Varint(value));
    }

    pub fn add_fixed32(&mut self, number: u32, value: u32) {
        self.add(number, UnknownValue::Fixed32(value));
    }

    pub fn add_fixed64(&mut self, number: u32, value: u64) {
        self.add(number, UnknownValue::Fixed64(value));
    }

    pub fn add_length_delimited(&mut self, number: u32, data: ByteString) {
        self.add(number, UnknownValue::LengthDelimited(data));
    }

    pub fn add_group(&mut self, number: u32, group: UnknownFieldSet) {
        self.add(number, UnknownValue::Group(group));
    }

    /// Removes every value of `number`.
    pub fn remove(&mut self, number: u32) -> Option<Vec<UnknownValue>> {
        self.fields.remove(&number)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Appends all of `other`'s values after this set's values of the same number.
    pub fn merge_from(&mut self, other: &UnknownFieldSet) {
        for (&number, values) in &other.fields {
            self.fields
                .entry(number)
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Reads the value of a field whose tag was just read. Returns `false` if the tag was an
    /// end-group tag.
    pub fn merge_field_from(
        &mut self,
        tag: u32,
        reader: &mut CodedReader<'_>,
    ) -> Result<bool, DecodeError> {
        let number = tag_field_number(tag);
        match tag_wire_type(tag)? {
            WireType::Varint => self.add_varint(number, reader.read_varint64()?),
            WireType::SixtyFourBit => self.add_fixed64(number, reader.read_fixed64()?),
            WireType::LengthDelimited => self.add_length_delimited(number, reader.read_bytes()?),
            WireType::StartGroup => {
                let group = reader.read_group(number, |reader| {
                    let mut group = UnknownFieldSet::new();
                    group.merge_from_reader(reader)?;
                    Ok(group)
                })?;
                self.add_group(number, group);
            }
            WireType::EndGroup => return Ok(false),
            WireType::ThirtyTwoBit => self.add_fixed32(number, reader.read_fixed32()?),
        }
        Ok(true)
    }

    /// Reads fields until the end of input, the current limit, or an end-group tag.
    pub fn merge_from_reader(&mut self, reader: &mut CodedReader<'_>) -> Result<(), DecodeError> {
        loop {
            let tag = reader.read_tag()?;
            if tag == 0 || !self.merge_field_from(tag, reader)? {
                return Ok(());
            }
        }
    }

    /// Parses a set from a complete buffer.
    pub fn parse_from(data: &[u8]) -> Result<UnknownFieldSet, DecodeError> {
        let mut reader = CodedReader::new(data);
        let mut set = UnknownFieldSet::new();
        set.merge_from_reader(&mut reader)?;
        reader.check_last_tag_was(0)?;
        Ok(set)
    }

    pub fn encoded_len(&self) -> usize {
        self.fields
            .iter()
            .flat_map(|(&number, values)| values.iter().map(move |value| value.encoded_len(number)))
            .sum()
    }

    pub fn write_to<B: BufMut>(&self, writer: &mut CodedWriter<B>) {
        for (&number, values) in &self.fields {
            for value in values {
                value.write_to(number, writer);
            }
        }
    }

    /// Encoded length when written by [`write_as_message_set_to`](Self::write_as_message_set_to).
    pub fn message_set_encoded_len(&self) -> usize {
        self.fields
            .iter()
            .flat_map(|(&number, values)| {
                values.iter().map(move |value| match value {
                    UnknownValue::LengthDelimited(data) => {
                        message_set_item_encoded_len(number, data.len())
                    }
                    other => other.encoded_len(number),
                })
            })
            .sum()
    }

    /// Writes length-delimited values as MessageSet items keyed by their field number, and
    /// everything else in the normal form.
    pub fn write_as_message_set_to<B: BufMut>(&self, writer: &mut CodedWriter<B>) {
        for (&number, values) in &self.fields {
            for value in values {
                match value {
                    UnknownValue::LengthDelimited(data) => {
                        write_message_set_item_header(number, data.len(), writer);
                        writer.write_raw_bytes(data.as_slice());
                        writer.write_tag(MESSAGE_SET_ITEM, WireType::EndGroup);
                    }
                    other => other.write_to(number, writer),
                }
            }
        }
    }
}

/// Encoded length of a MessageSet item with a payload of `len` bytes.
pub(crate) fn message_set_item_encoded_len(type_id: u32, len: usize) -> usize {
    2 * key_len(MESSAGE_SET_ITEM)
        + key_len(MESSAGE_SET_TYPE_ID)
        + encoded_len_varint(u64::from(type_id))
        + key_len(MESSAGE_SET_MESSAGE)
        + encoded_len_varint(len as u64)
        + len
}

/// Writes the item start tag, `type_id`, and the payload's tag and length prefix.
pub(crate) fn write_message_set_item_header<B: BufMut>(
    type_id: u32,
    len: usize,
    writer: &mut CodedWriter<B>,
) {
    writer.write_tag(MESSAGE_SET_ITEM, WireType::StartGroup);
    writer.write_tag(MESSAGE_SET_TYPE_ID, WireType::Varint);
    writer.write_uint32(type_id);
    writer.write_tag(MESSAGE_SET_MESSAGE, WireType::LengthDelimited);
    writer.write_varint(len as u64);
}

impl<'a> IntoIterator for &'a UnknownFieldSet {
    type Item = (&'a u32, &'a Vec<UnknownValue>);
    type IntoIter = btree_map::Iter<'a, u32, Vec<UnknownValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use alloc::vec;

    use super::*;
    use crate::error::DecodeErrorKind;

    #[test]
    fn preserves_bytes_and_order() {
        // 5: varint 150, 2: "hi", 5: fixed32, 3: group { 1: varint 1 }, 5: varint 1
        let data = [
            0x28, 0x96, 0x01, 0x12, 0x02, b'h', b'i', 0x2D, 1, 2, 3, 4, 0x1B, 0x08, 0x01, 0x1C,
            0x28, 0x01,
        ];
        let set = UnknownFieldSet::parse_from(&data).unwrap();
        assert_eq!(
            set.get(5),
            [
                UnknownValue::Varint(150),
                UnknownValue::Fixed32(0x0403_0201),
                UnknownValue::Varint(1)
            ]
        );
        let mut group = UnknownFieldSet::new();
        group.add_varint(1, 1);
        assert_eq!(set.get(3), [UnknownValue::Group(group)]);

        let mut writer = CodedWriter::new(Vec::new());
        set.write_to(&mut writer);
        assert_eq!(writer.written(), set.encoded_len());

        // Re-serialization is in field-number order, each number's values in encounter order.
        let expected = [
            0x12, 0x02, b'h', b'i', 0x1B, 0x08, 0x01, 0x1C, 0x28, 0x96, 0x01, 0x2D, 1, 2, 3, 4,
            0x28, 0x01,
        ];
        assert_eq!(writer.into_inner(), expected);
    }

    #[test]
    fn merge_concatenates() {
        let mut a = UnknownFieldSet::new();
        a.add_varint(1, 1);
        let mut b = UnknownFieldSet::new();
        b.add_varint(1, 2);
        b.add_fixed64(2, 3);
        a.merge_from(&b);
        assert_eq!(a.get(1), [UnknownValue::Varint(1), UnknownValue::Varint(2)]);
        assert_eq!(a.get(2), [UnknownValue::Fixed64(3)]);
        assert_eq!(a.len(), 2);
        assert!(a.get(9).is_empty());
    }

    #[test]
    fn unterminated_group_fails() {
        let err = UnknownFieldSet::parse_from(&[0x1B, 0x08, 0x01]).unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidEndTag);
    }

    #[test]
    fn stray_end_group_fails_at_top_level() {
        let err = UnknownFieldSet::parse_from(&[0x08, 0x01, 0x0C]).unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidEndTag);
    }

    #[test]
    fn message_set_form() {
        let mut set = UnknownFieldSet::new();
        set.add_length_delimited(1000, ByteString::from(vec![0x08, 0x01]));
        set.add_varint(7, 1);

        let mut writer = CodedWriter::new(Vec::new());
        set.write_as_message_set_to(&mut writer);
        assert_eq!(writer.written(), set.message_set_encoded_len());
        assert_eq!(
            writer.into_inner(),
            [0x38, 0x01, 0x0B, 0x10, 0xE8, 0x07, 0x1A, 0x02, 0x08, 0x01, 0x0C]
        );
    }
}
