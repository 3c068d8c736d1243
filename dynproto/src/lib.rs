#![doc(html_root_url = "https://docs.rs/dynproto/0.1.0")]
#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

// Re-export the alloc crate for `no_std` users of the public types.
#[doc(hidden)]
pub extern crate alloc;

// Re-export the bytes crate, whose traits appear in the public API.
pub use bytes;

mod bytestring;
mod descriptor;
mod error;
mod extension;
mod field_set;
mod message;
mod reader;
mod unknown;
mod value;
mod writer;

#[doc(hidden)]
pub mod encoding;

pub use crate::bytestring::ByteString;
pub use crate::descriptor::{
    Cardinality, DescriptorPool, DescriptorPoolBuilder, EnumDef, EnumDescriptor, FieldDef,
    FieldDescriptor, Kind, MessageDef, MessageDescriptor, OneofDescriptor, Type,
};
pub use crate::encoding::length_delimiter::{
    decode_length_delimiter, encode_length_delimiter, length_delimiter_len,
};
pub use crate::encoding::WireType;
pub use crate::error::{
    DecodeError, DecodeErrorKind, DescriptorError, EncodeError, UninitializedMessageError,
};
pub use crate::extension::ExtensionRegistry;
pub use crate::message::{DynamicMessage, Encode, MessageBuilder};
pub use crate::reader::{CodedReader, MessageSetDecoding};
pub use crate::unknown::{UnknownFieldSet, UnknownValue};
pub use crate::value::Value;
pub use crate::writer::CodedWriter;

/// Default limit on nested messages and groups while parsing.
pub const RECURSION_LIMIT: u32 = 64;

/// Default limit on the bytes a [`CodedReader`] pulls from a stream.
pub const SIZE_LIMIT: usize = 64 << 20;
