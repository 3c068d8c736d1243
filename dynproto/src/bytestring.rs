use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Bound, RangeBounds};
use core::str;

use ::bytes::{Bytes, BytesMut};

use crate::reader::CodedReader;

/// An immutable sequence of bytes.
///
/// Equality, ordering and hashing are structural. Construction copies the input
/// ([`copy_from`](ByteString::copy_from)) and [`to_vec`](ByteString::to_vec) copies out, so no
/// holder can observe another's mutation. Clones and [`substring`](ByteString::substring)s share
/// the same backing storage.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteString(Bytes);

impl ByteString {
    /// The empty byte string.
    pub const fn new() -> ByteString {
        ByteString(Bytes::new())
    }

    pub fn copy_from(data: &[u8]) -> ByteString {
        ByteString(Bytes::copy_from_slice(data))
    }

    pub fn copy_from_str(text: &str) -> ByteString {
        ByteString::copy_from(text.as_bytes())
    }

    pub const fn from_static(data: &'static [u8]) -> ByteString {
        ByteString(Bytes::from_static(data))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Copies the contents out into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Returns the byte at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn byte_at(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Returns the bytes in `range` without copying.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn substring(&self, range: impl RangeBounds<usize>) -> ByteString {
        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&n) => n + 1,
            Bound::Excluded(&n) => n,
            Bound::Unbounded => self.len(),
        };
        ByteString(self.0.slice(start..end))
    }

    /// Returns a new byte string holding `self` followed by `other`.
    pub fn concat(&self, other: &ByteString) -> ByteString {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut joined = BytesMut::with_capacity(self.len() + other.len());
        joined.extend_from_slice(&self.0);
        joined.extend_from_slice(&other.0);
        ByteString(joined.freeze())
    }

    pub fn starts_with(&self, prefix: &ByteString) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn is_valid_utf8(&self) -> bool {
        str::from_utf8(&self.0).is_ok()
    }

    /// Views the contents as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, str::Utf8Error> {
        str::from_utf8(&self.0)
    }

    /// Decodes the contents as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, u8> {
        self.0.iter()
    }

    /// Creates an array-backed reader over the contents.
    pub fn new_reader(&self) -> CodedReader<'_> {
        CodedReader::new(&self.0)
    }

    /// Returns the underlying shared buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(data: Vec<u8>) -> ByteString {
        ByteString(Bytes::from(data))
    }
}

impl From<String> for ByteString {
    fn from(text: String) -> ByteString {
        ByteString(Bytes::from(text))
    }
}

impl From<Bytes> for ByteString {
    fn from(data: Bytes) -> ByteString {
        ByteString(data)
    }
}

impl From<&[u8]> for ByteString {
    fn from(data: &[u8]) -> ByteString {
        ByteString::copy_from(data)
    }
}

impl<'a> IntoIterator for &'a ByteString {
    type Item = &'a u8;
    type IntoIter = core::slice::Iter<'a, u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("b\"")?;
        for &byte in self.0.iter() {
            for c in core::ascii::escape_default(byte) {
                fmt::Write::write_char(f, c as char)?;
            }
        }
        f.write_str("\"")
    }
}
