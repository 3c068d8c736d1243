//! Utility functions and types for encoding and decoding Protobuf types.
//!
//! This module contains the encoding and decoding primatives for Protobuf as described in
//! <https://protobuf.dev/programming-guides/encoding/>.
//!
//! Everything here is a pure function over integers or `bytes` buffers. The stateful
//! [`CodedReader`](crate::CodedReader) and [`CodedWriter`](crate::CodedWriter) are built on top.

use crate::error::DecodeError;

pub mod varint;
pub use varint::{
    decode_varint, decode_zigzag32, decode_zigzag64, encode_varint, encode_zigzag32,
    encode_zigzag64, encoded_len_varint, MAX_VARINT_LEN,
};

pub mod length_delimiter;
pub use length_delimiter::{
    decode_length_delimiter, encode_length_delimiter, length_delimiter_len,
};

pub mod wire_type;
pub use wire_type::WireType;

pub const MIN_TAG: u32 = 1;
pub const MAX_TAG: u32 = (1 << 29) - 1;

const TAG_TYPE_BITS: u32 = 3;
const TAG_TYPE_MASK: u32 = (1 << TAG_TYPE_BITS) - 1;

/// Field number of the repeated item group in the MessageSet wire format.
pub const MESSAGE_SET_ITEM: u32 = 1;
/// Field number of the `type_id` member of a MessageSet item.
pub const MESSAGE_SET_TYPE_ID: u32 = 2;
/// Field number of the `message` member of a MessageSet item.
pub const MESSAGE_SET_MESSAGE: u32 = 3;

pub const MESSAGE_SET_ITEM_TAG: u32 = make_tag(MESSAGE_SET_ITEM, WireType::StartGroup);
pub const MESSAGE_SET_TYPE_ID_TAG: u32 = make_tag(MESSAGE_SET_TYPE_ID, WireType::Varint);
pub const MESSAGE_SET_MESSAGE_TAG: u32 = make_tag(MESSAGE_SET_MESSAGE, WireType::LengthDelimited);

/// Combines a field number and wire type into a tag value.
#[inline]
pub const fn make_tag(number: u32, wire_type: WireType) -> u32 {
    (number << TAG_TYPE_BITS) | wire_type as u32
}

/// Extracts the field number from a tag value.
#[inline]
pub const fn tag_field_number(tag: u32) -> u32 {
    tag >> TAG_TYPE_BITS
}

/// Extracts the wire type from a tag value.
#[inline]
pub fn tag_wire_type(tag: u32) -> Result<WireType, DecodeError> {
    WireType::try_from(u64::from(tag & TAG_TYPE_MASK))
}

/// Width of the encoded tag for field `number`, between 1 and 5 bytes.
#[inline]
pub const fn key_len(number: u32) -> usize {
    encoded_len_varint((number << TAG_TYPE_BITS) as u64)
}
