//! Protobuf encoding and decoding errors.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use core::fmt;

/// A Protobuf message decoding error.
///
/// `DecodeError` indicates that the input buffer does not contain a valid
/// Protobuf message, or that a parsed message is missing required fields.
/// The [`kind`](DecodeError::kind) separates the two, since a caller may accept a
/// partial message in the second case but never in the first.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodeError {
    inner: Box<Inner>,
}

#[derive(Clone, PartialEq, Eq)]
struct Inner {
    kind: DecodeErrorKind,
    /// A 'call stack' of field names being decoded when the error occurred,
    /// outermost last.
    stack: Vec<(String, String)>,
}

/// The cause of a [`DecodeError`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// A varint ran past ten bytes without terminating.
    MalformedVarint,
    /// A tag carried field number zero somewhere other than end of input.
    InvalidTag,
    /// A tag carried a wire type outside `0..=5`.
    InvalidWireType(u64),
    /// The input ended, or a length limit was hit, in the middle of a value.
    Truncated,
    /// Nested messages or groups went deeper than the reader's recursion limit.
    RecursionLimitExceeded,
    /// A stream-backed reader consumed more than its size limit.
    SizeLimitExceeded,
    /// A length prefix decoded to a negative size.
    NegativeLength,
    /// An end-group tag did not match the open group, or a group was never closed.
    InvalidEndTag,
    /// A `string` field held bytes that are not UTF-8.
    InvalidUtf8,
    /// Required fields were missing; holds the path of each one.
    Uninitialized(Vec<String>),
    /// The underlying `std::io::Read` failed.
    #[cfg(feature = "std")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
    Other(Cow<'static, str>),
}

impl DecodeError {
    /// Creates a new `DecodeError` of the given kind.
    #[cold]
    pub fn new(kind: DecodeErrorKind) -> DecodeError {
        DecodeError {
            inner: Box::new(Inner {
                kind,
                stack: Vec::new(),
            }),
        }
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.inner.kind
    }

    /// Returns `true` when the bytes were well formed but required fields were missing.
    pub fn is_uninitialized(&self) -> bool {
        matches!(self.inner.kind, DecodeErrorKind::Uninitialized(_))
    }

    /// The missing field paths of an uninitialized-message error, empty otherwise.
    pub fn missing_fields(&self) -> &[String] {
        match &self.inner.kind {
            DecodeErrorKind::Uninitialized(missing) => missing,
            _ => &[],
        }
    }

    /// Pushes a (message, field) name location pair on to the location stack.
    ///
    /// Meant to be used only by decoding internals.
    #[doc(hidden)]
    pub fn push(&mut self, message: impl Into<String>, field: impl Into<String>) {
        self.inner.stack.push((message.into(), field.into()));
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeError")
            .field("kind", &self.inner.kind)
            .field("stack", &self.inner.stack)
            .finish()
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::MalformedVarint => f.write_str("invalid varint"),
            DecodeErrorKind::InvalidTag => f.write_str("invalid tag value: 0"),
            DecodeErrorKind::InvalidWireType(value) => {
                write!(f, "invalid wire type value: {value}")
            }
            DecodeErrorKind::Truncated => f.write_str(
                "input ended unexpectedly in the middle of a field, or a length was misreported",
            ),
            DecodeErrorKind::RecursionLimitExceeded => f.write_str("recursion limit reached"),
            DecodeErrorKind::SizeLimitExceeded => f.write_str("message size limit exceeded"),
            DecodeErrorKind::NegativeLength => f.write_str("negative length delimiter"),
            DecodeErrorKind::InvalidEndTag => f.write_str("unexpected end group tag"),
            DecodeErrorKind::InvalidUtf8 => {
                f.write_str("invalid string value: data is not UTF-8 encoded")
            }
            DecodeErrorKind::Uninitialized(missing) => {
                write!(f, "message missing required fields: {}", missing.join(", "))
            }
            #[cfg(feature = "std")]
            DecodeErrorKind::Io { message, .. } => write!(f, "read failed: {message}"),
            DecodeErrorKind::Other(description) => f.write_str(description),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to decode Protobuf message: ")?;
        for (message, field) in self.inner.stack.iter().rev() {
            write!(f, "{message}.{field}: ")?;
        }
        fmt::Display::fmt(&self.inner.kind, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "std")]
impl From<DecodeError> for std::io::Error {
    fn from(error: DecodeError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidData, error)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for DecodeError {
    fn from(error: std::io::Error) -> DecodeError {
        if error.kind() == std::io::ErrorKind::UnexpectedEof {
            DecodeError::new(DecodeErrorKind::Truncated)
        } else {
            DecodeError::new(DecodeErrorKind::Io {
                kind: error.kind(),
                message: alloc::string::ToString::to_string(&error),
            })
        }
    }
}

/// A Protobuf message encoding error.
///
/// `EncodeError` always indicates that a message failed to encode because the
/// provided buffer had insufficient capacity. Message encoding is otherwise
/// infallible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodeError {
    required: usize,
    remaining: usize,
}

impl EncodeError {
    /// Creates a new `EncodeError`.
    pub(crate) fn new(required: usize, remaining: usize) -> EncodeError {
        EncodeError {
            required,
            remaining,
        }
    }

    /// Returns the required buffer capacity to encode the message.
    pub fn required_capacity(&self) -> usize {
        self.required
    }

    /// Returns the remaining length in the provided buffer at the time of encoding.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to encode Protobuf message; insufficient buffer capacity (required: {}, remaining: {})",
            self.required, self.remaining
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[cfg(feature = "std")]
impl From<EncodeError> for std::io::Error {
    fn from(error: EncodeError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, error)
    }
}

/// Required fields were missing when a message was built.
///
/// [`MessageBuilder::build`](crate::MessageBuilder::build) treats this as a programming error
/// and panics with it; parsing converts it into a recoverable [`DecodeError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UninitializedMessageError {
    missing: Vec<String>,
}

impl UninitializedMessageError {
    pub(crate) fn new(missing: Vec<String>) -> UninitializedMessageError {
        UninitializedMessageError { missing }
    }

    /// Paths of the missing required fields, e.g. `foo.bar[2].baz`.
    pub fn missing_fields(&self) -> &[String] {
        &self.missing
    }

    pub fn into_decode_error(self) -> DecodeError {
        DecodeError::new(DecodeErrorKind::Uninitialized(self.missing))
    }
}

impl fmt::Display for UninitializedMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message missing required fields: {}",
            self.missing.join(", ")
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UninitializedMessageError {}

/// A message schema could not be assembled into a [`DescriptorPool`](crate::DescriptorPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorError {
    description: Cow<'static, str>,
}

impl DescriptorError {
    pub(crate) fn new(description: impl Into<Cow<'static, str>>) -> DescriptorError {
        DescriptorError {
            description: description.into(),
        }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid message schema: {}", self.description)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DescriptorError {}

#[cfg(test)]
mod test {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn test_push() {
        let mut decode_error = DecodeError::new(DecodeErrorKind::Truncated);
        decode_error.push("Foo bad", "bar.foo");
        decode_error.push("Baz bad", "bar.baz");

        assert_eq!(
            decode_error.to_string(),
            "failed to decode Protobuf message: Baz bad.bar.baz: Foo bad.bar.foo: \
             input ended unexpectedly in the middle of a field, or a length was misreported"
        );
    }

    #[test]
    fn uninitialized_is_distinct() {
        let error = UninitializedMessageError::new(vec!["a".to_string(), "b.c".to_string()])
            .into_decode_error();
        assert!(error.is_uninitialized());
        assert_eq!(error.missing_fields(), ["a", "b.c"]);
        assert!(!DecodeError::new(DecodeErrorKind::InvalidTag).is_uninitialized());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_into_std_io_error() {
        let decode_error = DecodeError::new(DecodeErrorKind::InvalidTag);
        let std_io_error = std::io::Error::from(decode_error);

        assert_eq!(std_io_error.kind(), std::io::ErrorKind::InvalidData);
        assert_eq!(
            std_io_error.to_string(),
            "failed to decode Protobuf message: invalid tag value: 0"
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn unexpected_eof_is_truncation() {
        let io_error = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(
            DecodeError::from(io_error).kind(),
            &DecodeErrorKind::Truncated
        );
    }
}
