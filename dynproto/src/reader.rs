//! The bounded wire-format reader.

#[cfg(feature = "std")]
use alloc::boxed::Box;
use alloc::string::String;
#[cfg(feature = "std")]
use alloc::vec;
use alloc::vec::Vec;

use crate::bytestring::ByteString;
use crate::encoding::varint::{decode_varint_slice, MAX_VARINT_LEN};
use crate::encoding::{
    decode_zigzag32, decode_zigzag64, make_tag, tag_field_number, tag_wire_type, WireType,
};
use crate::error::{DecodeError, DecodeErrorKind};
use crate::{RECURSION_LIMIT, SIZE_LIMIT};

/// Initial buffer size for stream-backed readers.
#[cfg(feature = "std")]
const BUFFER_SIZE: usize = 4096;

/// How a MessageSet item whose `type_id` arrives before its payload is decoded.
///
/// Both strategies produce the same message; they differ only in whether the payload is copied
/// out of the input before it is parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MessageSetDecoding {
    /// Parse the payload straight from the input once the extension is known.
    #[default]
    Streaming,
    /// Always copy the payload out first and parse it after the item group closes.
    Buffered,
}

enum Source<'a> {
    Slice(&'a [u8]),
    #[cfg(feature = "std")]
    Stream {
        inner: Box<dyn std::io::Read + 'a>,
        buf: Vec<u8>,
    },
}

/// Reads Protobuf wire-format values from a byte slice or a `std::io::Read`.
///
/// The reader tracks three bounds:
///
/// * a current limit, an absolute offset pushed when entering a length-delimited value
///   ([`push_limit`](Self::push_limit)) and restored on exit ([`pop_limit`](Self::pop_limit));
///   reading past it is a truncation error,
/// * a recursion limit on nested messages and groups (default [`RECURSION_LIMIT`]),
/// * for stream-backed input only, a size limit on the total bytes pulled from the stream
///   (default [`SIZE_LIMIT`]).
pub struct CodedReader<'a> {
    source: Source<'a>,
    /// Read position within the current chunk.
    buf_pos: usize,
    /// Number of valid bytes in the current chunk.
    buf_len: usize,
    /// Bytes consumed before the start of the current chunk.
    retired: usize,
    /// Absolute offset reads may not pass; `usize::MAX` when no limit is pushed.
    current_limit: usize,
    last_tag: u32,
    recursion_depth: u32,
    recursion_limit: u32,
    size_limit: usize,
    /// Absolute offset from which the size limit is counted.
    size_base: usize,
    message_set_decoding: MessageSetDecoding,
}

impl<'a> CodedReader<'a> {
    /// Creates an array-backed reader. The size limit does not apply.
    pub fn new(data: &'a [u8]) -> CodedReader<'a> {
        CodedReader {
            source: Source::Slice(data),
            buf_pos: 0,
            buf_len: data.len(),
            retired: 0,
            current_limit: usize::MAX,
            last_tag: 0,
            recursion_depth: 0,
            recursion_limit: RECURSION_LIMIT,
            size_limit: SIZE_LIMIT,
            size_base: 0,
            message_set_decoding: MessageSetDecoding::default(),
        }
    }

    /// Creates a stream-backed reader which pulls bytes from `inner` as needed.
    #[cfg(feature = "std")]
    pub fn from_read(inner: impl std::io::Read + 'a) -> CodedReader<'a> {
        CodedReader {
            source: Source::Stream {
                inner: Box::new(inner),
                buf: vec![0; BUFFER_SIZE],
            },
            buf_pos: 0,
            buf_len: 0,
            retired: 0,
            current_limit: usize::MAX,
            last_tag: 0,
            recursion_depth: 0,
            recursion_limit: RECURSION_LIMIT,
            size_limit: SIZE_LIMIT,
            size_base: 0,
            message_set_decoding: MessageSetDecoding::default(),
        }
    }

    /// Reads a message body that was already extracted from this reader's input, with the
    /// same limits and depth accounting as [`read_message`](Self::read_message).
    pub(crate) fn read_buffered_message<T>(
        &self,
        data: &[u8],
        read: impl FnOnce(&mut CodedReader<'_>) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        let mut reader = CodedReader::new(data);
        reader.recursion_depth = self.recursion_depth;
        reader.recursion_limit = self.recursion_limit;
        reader.message_set_decoding = self.message_set_decoding;
        reader.enter_recursion()?;
        let value = read(&mut reader)?;
        reader.check_last_tag_was(0)?;
        Ok(value)
    }

    /// Sets the maximum nesting depth of messages and groups, returning the old limit.
    pub fn set_recursion_limit(&mut self, limit: u32) -> u32 {
        core::mem::replace(&mut self.recursion_limit, limit)
    }

    /// Sets the maximum number of bytes a stream-backed reader will pull, returning the old
    /// limit. Has no effect on array-backed readers.
    pub fn set_size_limit(&mut self, limit: usize) -> usize {
        core::mem::replace(&mut self.size_limit, limit)
    }

    /// Restarts size-limit accounting from the current position, so a reader can be used for
    /// a long sequence of individually small messages.
    pub fn reset_size_counter(&mut self) {
        self.size_base = self.position();
    }

    pub fn set_message_set_decoding(&mut self, decoding: MessageSetDecoding) {
        self.message_set_decoding = decoding;
    }

    pub fn message_set_decoding(&self) -> MessageSetDecoding {
        self.message_set_decoding
    }

    /// Total bytes consumed so far.
    pub fn total_bytes_read(&self) -> usize {
        self.position()
    }

    #[inline]
    fn position(&self) -> usize {
        self.retired + self.buf_pos
    }

    fn is_stream(&self) -> bool {
        !matches!(self.source, Source::Slice(_))
    }

    /// The buffered bytes that may be read without passing the current limit.
    #[inline]
    fn available(&self) -> &[u8] {
        let end = core::cmp::min(self.buf_len, self.current_limit.saturating_sub(self.retired));
        let end = core::cmp::max(end, self.buf_pos);
        match &self.source {
            Source::Slice(data) => &data[self.buf_pos..end],
            #[cfg(feature = "std")]
            Source::Stream { buf, .. } => &buf[self.buf_pos..end],
        }
    }

    /// Pulls more bytes from the stream. Returns `false` at end of input or at the current limit.
    fn refill(&mut self) -> Result<bool, DecodeError> {
        if self.position() >= self.current_limit {
            return Ok(false);
        }
        match &mut self.source {
            Source::Slice(_) => Ok(false),
            #[cfg(feature = "std")]
            Source::Stream { inner, buf } => {
                if self.buf_pos > 0 {
                    buf.copy_within(self.buf_pos..self.buf_len, 0);
                    self.retired += self.buf_pos;
                    self.buf_len -= self.buf_pos;
                    self.buf_pos = 0;
                }
                if self.buf_len == buf.len() {
                    let grown = buf.len() * 2;
                    buf.resize(grown, 0);
                }

                // Never buffer past the size limit. Once there, pull a single byte to tell the
                // end of the stream apart from a stream that runs over the limit.
                let size_end = self.size_base.saturating_add(self.size_limit);
                let room = size_end.saturating_sub(self.retired + self.buf_len);
                let end = self.buf_len + room.clamp(1, buf.len() - self.buf_len);
                let read = loop {
                    match inner.read(&mut buf[self.buf_len..end]) {
                        Ok(read) => break read,
                        Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(error) => return Err(error.into()),
                    }
                };
                if read == 0 {
                    return Ok(false);
                }
                self.buf_len += read;

                if self.retired + self.buf_len > size_end {
                    log::debug!(
                        "stream exceeded size limit of {} bytes",
                        self.size_limit
                    );
                    return Err(DecodeError::new(DecodeErrorKind::SizeLimitExceeded));
                }
                Ok(true)
            }
        }
    }

    /// Makes at least `n` bytes available, or fails with a truncation error.
    fn ensure(&mut self, n: usize) -> Result<(), DecodeError> {
        if self.available().len() >= n {
            return Ok(());
        }
        if self
            .position()
            .checked_add(n)
            .map_or(true, |end| end > self.current_limit)
        {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }
        while self.available().len() < n {
            if !self.refill()? {
                return Err(DecodeError::new(DecodeErrorKind::Truncated));
            }
        }
        Ok(())
    }

    /// Returns `true` if the current limit or the end of input has been reached.
    pub fn is_at_end(&mut self) -> Result<bool, DecodeError> {
        if !self.available().is_empty() {
            return Ok(false);
        }
        Ok(!self.refill()?)
    }

    /// Bytes remaining before the current limit, or `None` when no limit is pushed.
    pub fn bytes_until_limit(&self) -> Option<usize> {
        if self.current_limit == usize::MAX {
            None
        } else {
            Some(self.current_limit - self.position())
        }
    }

    /// Limits reads to the next `length` bytes, returning the previous limit to hand back to
    /// [`pop_limit`](Self::pop_limit).
    pub fn push_limit(&mut self, length: usize) -> Result<usize, DecodeError> {
        let limit = self
            .position()
            .checked_add(length)
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::Truncated))?;
        if limit > self.current_limit {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }
        Ok(core::mem::replace(&mut self.current_limit, limit))
    }

    /// Restores a limit returned by [`push_limit`](Self::push_limit).
    pub fn pop_limit(&mut self, old_limit: usize) {
        self.current_limit = old_limit;
    }

    /// Reads a field tag.
    ///
    /// Returns 0 at the end of input or at the current limit, since messages carry no
    /// terminator of their own. Any other tag with field number 0 is an error.
    pub fn read_tag(&mut self) -> Result<u32, DecodeError> {
        if self.is_at_end()? {
            self.last_tag = 0;
            return Ok(0);
        }
        let tag = self.read_varint32()?;
        if tag_field_number(tag) == 0 {
            return Err(DecodeError::new(DecodeErrorKind::InvalidTag));
        }
        tag_wire_type(tag)?;
        self.last_tag = tag;
        Ok(tag)
    }

    /// The most recent value returned by [`read_tag`](Self::read_tag).
    pub fn last_tag(&self) -> u32 {
        self.last_tag
    }

    /// Verifies that the last tag read was `expected`: 0 after a message body, the matching
    /// end-group tag after a group body.
    pub fn check_last_tag_was(&self, expected: u32) -> Result<(), DecodeError> {
        if self.last_tag != expected {
            return Err(DecodeError::new(DecodeErrorKind::InvalidEndTag));
        }
        Ok(())
    }

    /// Skips the value of a field whose tag was just read. Returns `false` if the tag was an
    /// end-group tag.
    pub fn skip_field(&mut self, tag: u32) -> Result<bool, DecodeError> {
        match tag_wire_type(tag)? {
            WireType::Varint => {
                self.read_varint64()?;
            }
            WireType::SixtyFourBit => self.skip_raw_bytes(8)?,
            WireType::LengthDelimited => {
                let length = self.read_length()?;
                self.skip_raw_bytes(length)?;
            }
            WireType::StartGroup => {
                let number = tag_field_number(tag);
                self.read_group(number, |reader| reader.skip_message())?;
            }
            WireType::EndGroup => return Ok(false),
            WireType::ThirtyTwoBit => self.skip_raw_bytes(4)?,
        }
        Ok(true)
    }

    /// Skips fields until the end of input, the current limit, or an end-group tag.
    pub fn skip_message(&mut self) -> Result<(), DecodeError> {
        loop {
            let tag = self.read_tag()?;
            if tag == 0 || !self.skip_field(tag)? {
                return Ok(());
            }
        }
    }

    /// Reads a length-delimited value's body with `read`, which must consume it exactly.
    ///
    /// Counts as one level of recursion.
    pub fn read_message<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        let length = self.read_length()?;
        self.enter_recursion()?;
        let old_limit = self.push_limit(length)?;
        let value = read(self)?;
        self.check_last_tag_was(0)?;
        if self.bytes_until_limit() != Some(0) {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }
        self.pop_limit(old_limit);
        self.exit_recursion();
        Ok(value)
    }

    /// Reads a group body with `read`, then requires the end-group tag for `number`.
    ///
    /// Counts as one level of recursion.
    pub fn read_group<T>(
        &mut self,
        number: u32,
        read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        self.enter_recursion()?;
        let value = read(self)?;
        self.check_last_tag_was(make_tag(number, WireType::EndGroup))?;
        self.exit_recursion();
        Ok(value)
    }

    fn enter_recursion(&mut self) -> Result<(), DecodeError> {
        if self.recursion_depth >= self.recursion_limit {
            log::debug!("recursion limit of {} reached", self.recursion_limit);
            return Err(DecodeError::new(DecodeErrorKind::RecursionLimitExceeded));
        }
        self.recursion_depth += 1;
        Ok(())
    }

    fn exit_recursion(&mut self) {
        self.recursion_depth -= 1;
    }

    pub fn read_raw_byte(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        let byte = self.available()[0];
        self.buf_pos += 1;
        Ok(byte)
    }

    /// Reads exactly `size` bytes.
    ///
    /// Stream-backed readers grow the result as bytes arrive rather than trusting `size` for
    /// the allocation.
    pub fn read_raw_bytes(&mut self, size: usize) -> Result<Vec<u8>, DecodeError> {
        if self
            .position()
            .checked_add(size)
            .map_or(true, |end| end > self.current_limit)
        {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }
        if !self.is_stream() && self.available().len() < size {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }

        let mut data = Vec::with_capacity(core::cmp::min(size, self.available().len().max(64)));
        while data.len() < size {
            let chunk = self.available();
            if chunk.is_empty() {
                if !self.refill()? {
                    return Err(DecodeError::new(DecodeErrorKind::Truncated));
                }
                continue;
            }
            let take = core::cmp::min(chunk.len(), size - data.len());
            data.extend_from_slice(&chunk[..take]);
            self.buf_pos += take;
        }
        Ok(data)
    }

    pub fn skip_raw_bytes(&mut self, size: usize) -> Result<(), DecodeError> {
        if self
            .position()
            .checked_add(size)
            .map_or(true, |end| end > self.current_limit)
        {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }
        let mut remaining = size;
        while remaining > 0 {
            let buffered = self.available().len();
            if buffered == 0 {
                if !self.refill()? {
                    return Err(DecodeError::new(DecodeErrorKind::Truncated));
                }
                continue;
            }
            let take = core::cmp::min(buffered, remaining);
            self.buf_pos += take;
            remaining -= take;
        }
        Ok(())
    }

    /// Reads a varint of up to ten bytes. Bits beyond the 64th are discarded.
    #[inline]
    pub fn read_varint64(&mut self) -> Result<u64, DecodeError> {
        let chunk = self.available();
        if chunk.len() >= MAX_VARINT_LEN || chunk.last().map_or(false, |&byte| byte < 0x80) {
            let (value, consumed) = decode_varint_slice(chunk)?;
            self.buf_pos += consumed;
            return Ok(value);
        }
        self.read_varint64_slow()
    }

    #[cold]
    fn read_varint64_slow(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for count in 0..MAX_VARINT_LEN {
            let byte = self.read_raw_byte()?;
            value |= u64::from(byte & 0x7F) << (7 * count);
            if byte < 0x80 {
                return Ok(value);
            }
        }
        Err(DecodeError::new(DecodeErrorKind::MalformedVarint))
    }

    /// Reads a varint and keeps its low 32 bits. Negative `int32` values are sent
    /// sign-extended to ten bytes, so truncation recovers them.
    #[inline]
    pub fn read_varint32(&mut self) -> Result<u32, DecodeError> {
        self.read_varint64().map(|value| value as u32)
    }

    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.available()[..4]);
        self.buf_pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.available()[..8]);
        self.buf_pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_int32(&mut self) -> Result<i32, DecodeError> {
        self.read_varint32().map(|value| value as i32)
    }

    pub fn read_int64(&mut self) -> Result<i64, DecodeError> {
        self.read_varint64().map(|value| value as i64)
    }

    pub fn read_uint32(&mut self) -> Result<u32, DecodeError> {
        self.read_varint32()
    }

    pub fn read_uint64(&mut self) -> Result<u64, DecodeError> {
        self.read_varint64()
    }

    pub fn read_sint32(&mut self) -> Result<i32, DecodeError> {
        self.read_varint32().map(decode_zigzag32)
    }

    pub fn read_sint64(&mut self) -> Result<i64, DecodeError> {
        self.read_varint64().map(decode_zigzag64)
    }

    pub fn read_sfixed32(&mut self) -> Result<i32, DecodeError> {
        self.read_fixed32().map(|value| value as i32)
    }

    pub fn read_sfixed64(&mut self) -> Result<i64, DecodeError> {
        self.read_fixed64().map(|value| value as i64)
    }

    pub fn read_float(&mut self) -> Result<f32, DecodeError> {
        self.read_fixed32().map(f32::from_bits)
    }

    pub fn read_double(&mut self) -> Result<f64, DecodeError> {
        self.read_fixed64().map(f64::from_bits)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        self.read_varint64().map(|value| value != 0)
    }

    pub fn read_enum(&mut self) -> Result<i32, DecodeError> {
        self.read_int32()
    }

    /// Reads a length prefix.
    pub fn read_length(&mut self) -> Result<usize, DecodeError> {
        let length = self.read_varint32()? as i32;
        if length < 0 {
            return Err(DecodeError::new(DecodeErrorKind::NegativeLength));
        }
        Ok(length as usize)
    }

    pub fn read_bytes(&mut self) -> Result<ByteString, DecodeError> {
        let length = self.read_length()?;
        self.read_raw_bytes(length).map(ByteString::from)
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let length = self.read_length()?;
        let data = self.read_raw_bytes(length)?;
        String::from_utf8(data).map_err(|_| DecodeError::new(DecodeErrorKind::InvalidUtf8))
    }
}

impl core::fmt::Debug for CodedReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CodedReader")
            .field("position", &self.position())
            .field("current_limit", &self.bytes_until_limit())
            .field("recursion_depth", &self.recursion_depth)
            .field("recursion_limit", &self.recursion_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use alloc::vec::Vec;

    use proptest::prelude::*;

    use super::*;
    use crate::encoding::encode_varint;

    /// A `Read` that hands out one byte per call, to exercise refills.
    #[cfg(feature = "std")]
    struct Trickle<'a>(&'a [u8]);

    #[cfg(feature = "std")]
    impl std::io::Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn varint32_discards_high_bits() {
        let mut buf = Vec::new();
        encode_varint(0x1_0000_0005, &mut buf);
        let mut reader = CodedReader::new(&buf);
        assert_eq!(reader.read_varint32().unwrap(), 5);
    }

    #[test]
    fn negative_int32_roundtrips_through_ten_bytes() {
        let mut buf = Vec::new();
        encode_varint(-2i32 as i64 as u64, &mut buf);
        assert_eq!(buf.len(), 10);
        assert_eq!(CodedReader::new(&buf).read_int32().unwrap(), -2);
    }

    #[test]
    fn malformed_varint() {
        let data = [0x80u8; 11];
        let err = CodedReader::new(&data).read_varint64().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::MalformedVarint);

        // A short slice ending in continuation bytes is truncated rather than malformed.
        let err = CodedReader::new(&data[..3]).read_varint64().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::Truncated);
    }

    #[test]
    fn read_tag_at_end_is_zero() {
        let mut reader = CodedReader::new(&[]);
        assert_eq!(reader.read_tag().unwrap(), 0);
        assert!(reader.check_last_tag_was(0).is_ok());
    }

    #[test]
    fn zero_field_number_is_invalid() {
        let err = CodedReader::new(&[0x00]).read_tag().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidTag);
        let err = CodedReader::new(&[0x05]).read_tag().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidTag);
    }

    #[test]
    fn invalid_wire_type() {
        let err = CodedReader::new(&[0x0F]).read_tag().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidWireType(7));
    }

    #[test]
    fn limits_nest() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut reader = CodedReader::new(&data);
        assert_eq!(reader.bytes_until_limit(), None);

        let outer = reader.push_limit(4).unwrap();
        assert_eq!(reader.bytes_until_limit(), Some(4));
        reader.read_raw_byte().unwrap();

        let inner = reader.push_limit(2).unwrap();
        assert_eq!(reader.read_raw_bytes(2).unwrap(), [2, 3]);
        assert!(reader.is_at_end().unwrap());
        assert_eq!(
            reader.read_raw_byte().unwrap_err().kind(),
            &DecodeErrorKind::Truncated
        );
        reader.pop_limit(inner);

        assert_eq!(reader.bytes_until_limit(), Some(1));
        // A nested limit may not extend past its parent.
        assert!(reader.push_limit(2).is_err());
        reader.pop_limit(outer);
        assert_eq!(reader.read_raw_bytes(3).unwrap(), [4, 5, 6]);
        assert!(reader.is_at_end().unwrap());
    }

    #[test]
    fn negative_length() {
        let mut buf = Vec::new();
        encode_varint(-1i32 as u32 as u64, &mut buf);
        let err = CodedReader::new(&buf).read_bytes().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::NegativeLength);
    }

    #[test]
    fn length_past_end_is_truncated() {
        let data = [0x05, b'a', b'b'];
        let err = CodedReader::new(&data).read_bytes().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::Truncated);
    }

    #[test]
    fn invalid_utf8() {
        let data = [0x02, 0xFF, 0xFE];
        let err = CodedReader::new(&data).read_string().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidUtf8);
    }

    #[test]
    fn skip_unterminated_group() {
        // field 1 start group, field 2 varint, then end of input.
        let data = [0x0B, 0x10, 0x01];
        let mut reader = CodedReader::new(&data);
        let tag = reader.read_tag().unwrap();
        let err = reader.skip_field(tag).unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidEndTag);
    }

    #[test]
    fn skip_mismatched_end_group() {
        // field 1 start group closed by field 2 end group.
        let data = [0x0B, 0x14];
        let mut reader = CodedReader::new(&data);
        let tag = reader.read_tag().unwrap();
        let err = reader.skip_field(tag).unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidEndTag);
    }

    #[test]
    fn skip_nested_groups() {
        // 1: group { 2: group { 3: fixed32 } }, 4: varint
        let data = [
            0x0B, 0x13, 0x1D, 0x01, 0x02, 0x03, 0x04, 0x14, 0x0C, 0x20, 0x07,
        ];
        let mut reader = CodedReader::new(&data);
        let tag = reader.read_tag().unwrap();
        assert!(reader.skip_field(tag).unwrap());
        assert_eq!(reader.read_tag().unwrap(), 0x20);
        assert_eq!(reader.read_varint64().unwrap(), 7);
        assert_eq!(reader.read_tag().unwrap(), 0);
    }

    #[test]
    fn group_recursion_limit() {
        let mut data = Vec::new();
        for _ in 0..3 {
            data.push(0x0B);
        }
        for _ in 0..3 {
            data.push(0x0C);
        }
        let mut reader = CodedReader::new(&data);
        reader.set_recursion_limit(2);
        let err = reader.skip_message().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::RecursionLimitExceeded);

        let mut reader = CodedReader::new(&data);
        reader.set_recursion_limit(3);
        reader.skip_message().unwrap();
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_reads_across_refills() {
        let mut data = Vec::new();
        encode_varint(u64::MAX, &mut data);
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        data.push(0x03);
        data.extend_from_slice(b"abc");

        let mut reader = CodedReader::from_read(Trickle(&data));
        assert_eq!(reader.read_varint64().unwrap(), u64::MAX);
        assert_eq!(reader.read_fixed32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_string().unwrap(), "abc");
        assert!(reader.is_at_end().unwrap());
        assert_eq!(reader.total_bytes_read(), data.len());
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_size_limit() {
        let data = [0x7Fu8; 32];
        let mut reader = CodedReader::from_read(&data[..]);
        reader.set_size_limit(16);
        let err = reader.read_raw_bytes(32).unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::SizeLimitExceeded);

        // Array-backed readers ignore the size limit.
        let mut reader = CodedReader::new(&data);
        reader.set_size_limit(16);
        assert_eq!(reader.read_raw_bytes(32).unwrap().len(), 32);
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_size_limit_counts_consumed_bytes() {
        // A 60 byte value followed by more input than the limit allows.
        let mut data = Vec::new();
        encode_varint(59, &mut data);
        data.extend_from_slice(&[0xAB; 59]);
        data.extend_from_slice(&[0xCD; 200]);

        let mut reader = CodedReader::from_read(&data[..]);
        reader.set_size_limit(100);
        assert_eq!(reader.read_bytes().unwrap().len(), 59);
        assert_eq!(reader.total_bytes_read(), 60);

        assert_eq!(reader.read_raw_bytes(40).unwrap(), [0xCD; 40]);
        let err = reader.read_raw_byte().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::SizeLimitExceeded);
    }

    #[cfg(feature = "std")]
    #[test]
    fn reset_size_counter_between_values() {
        let mut data = Vec::new();
        for i in 0..10u8 {
            encode_varint(49, &mut data);
            data.extend_from_slice(&[i; 49]);
        }

        let mut reader = CodedReader::from_read(&data[..]);
        reader.set_size_limit(100);
        for i in 0..10u8 {
            assert_eq!(reader.read_bytes().unwrap().as_slice(), [i; 49]);
            reader.reset_size_counter();
        }
        assert!(reader.is_at_end().unwrap());
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_ending_at_size_limit_is_not_an_error() {
        let data = [0x01u8; 16];
        let mut reader = CodedReader::from_read(&data[..]);
        reader.set_size_limit(16);
        assert_eq!(reader.read_raw_bytes(16).unwrap().len(), 16);
        assert!(reader.is_at_end().unwrap());
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_large_length_is_truncated_without_allocating() {
        let mut data = Vec::new();
        encode_varint(i32::MAX as u64, &mut data);
        data.extend_from_slice(b"short");
        let err = CodedReader::from_read(&data[..]).read_bytes().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::Truncated);
    }

    proptest! {
        #[test]
        fn varint_roundtrip_through_reader(value: u64) {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let mut reader = CodedReader::new(&buf);
            prop_assert_eq!(reader.read_varint64().unwrap(), value);
            prop_assert!(reader.is_at_end().unwrap());
        }

        #[test]
        fn truncated_varint_fails(value in 128u64.., cut in 1usize..10) {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let cut = cut.min(buf.len() - 1);
            let mut reader = CodedReader::new(&buf[..cut]);
            let err = reader.read_varint64().unwrap_err();
            prop_assert_eq!(err.kind(), &DecodeErrorKind::Truncated);
        }
    }
}
