//! Base-128 variable length integers and the ZigZag mapping used by `sint32`/`sint64`.

use core::cmp::min;

use ::bytes::{Buf, BufMut};

use crate::error::{DecodeError, DecodeErrorKind};

/// The maximum number of bytes a varint can occupy on the wire.
pub const MAX_VARINT_LEN: usize = 10;

/// Encodes an integer value into LEB128 variable length format, and writes it to the buffer.
/// The buffer must have enough remaining space (maximum 10 bytes).
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    // Varints are never more than 10 bytes
    for _ in 0..MAX_VARINT_LEN {
        if value < 0x80 {
            buf.put_u8(value as u8);
            break;
        } else {
            buf.put_u8(((value & 0x7F) | 0x80) as u8);
            value >>= 7;
        }
    }
}

/// Returns the encoded length of the value in LEB128 variable length format.
/// The returned value will be between 1 and 10, inclusive.
#[inline]
pub const fn encoded_len_varint(value: u64) -> usize {
    // Based on [VarintSize64][1].
    // [1]: https://github.com/google/protobuf/blob/3.3.x/src/google/protobuf/io/coded_stream.h#L1301-L1309
    ((((value | 1).leading_zeros() ^ 63) * 9 + 73) / 64) as usize
}

/// Decodes a LEB128-encoded variable length integer from the buffer.
///
/// Bits beyond the 64th are discarded. More than ten bytes with the continuation bit
/// set is a malformed varint.
#[inline]
pub fn decode_varint(buf: &mut impl Buf) -> Result<u64, DecodeError> {
    let bytes = buf.chunk();
    let len = bytes.len();
    if len == 0 {
        return Err(DecodeError::new(DecodeErrorKind::Truncated));
    }

    let byte = bytes[0];
    if byte < 0x80 {
        buf.advance(1);
        Ok(u64::from(byte))
    } else if len >= MAX_VARINT_LEN || bytes[len - 1] < 0x80 {
        let (value, advance) = decode_varint_slice(bytes)?;
        buf.advance(advance);
        Ok(value)
    } else {
        decode_varint_slow(buf)
    }
}

/// Decodes a varint from the front of a contiguous slice, returning the value and the
/// number of bytes it occupied.
#[inline]
pub(crate) fn decode_varint_slice(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value = 0u64;
    for (count, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * count);
        if byte < 0x80 {
            return Ok((value, count + 1));
        }
    }
    if bytes.len() < MAX_VARINT_LEN {
        Err(DecodeError::new(DecodeErrorKind::Truncated))
    } else {
        Err(DecodeError::new(DecodeErrorKind::MalformedVarint))
    }
}

/// Decodes a LEB128-encoded variable length integer from the buffer, advancing the buffer as
/// necessary.
///
/// Used when the varint may straddle chunk boundaries.
#[inline(never)]
#[cold]
fn decode_varint_slow(buf: &mut impl Buf) -> Result<u64, DecodeError> {
    let mut value = 0;
    for count in 0..min(MAX_VARINT_LEN, buf.remaining()) {
        let byte = buf.get_u8();
        value |= u64::from(byte & 0x7F) << (count * 7);
        if byte <= 0x7F {
            return Ok(value);
        }
    }
    if buf.has_remaining() {
        Err(DecodeError::new(DecodeErrorKind::MalformedVarint))
    } else {
        Err(DecodeError::new(DecodeErrorKind::Truncated))
    }
}

/// Maps a signed 32-bit integer onto an unsigned one so small magnitudes stay small.
#[inline]
pub const fn encode_zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
pub const fn decode_zigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
}

/// Maps a signed 64-bit integer onto an unsigned one so small magnitudes stay small.
#[inline]
pub const fn encode_zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub const fn decode_zigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}
