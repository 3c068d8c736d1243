use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::sync::atomic::{AtomicUsize, Ordering};

use ::bytes::BufMut;

use crate::descriptor::{FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor};
use crate::encoding::varint::{encode_varint, encoded_len_varint};
use crate::encoding::{tag_field_number, tag_wire_type, WireType, MESSAGE_SET_ITEM_TAG};
use crate::error::{DecodeError, EncodeError, UninitializedMessageError};
use crate::extension::ExtensionRegistry;
use crate::field_set::FieldSet;
use crate::reader::CodedReader;
use crate::unknown::UnknownFieldSet;
use crate::value::Value;
use crate::writer::CodedWriter;

mod message_set;

/// Trait for encoding protobuf messages.
///
/// Implemented by [`DynamicMessage`] and [`UnknownFieldSet`].
///
/// # Examples
///
/// ```ignore
/// use dynproto::Encode;
///
/// let message: DynamicMessage = ...;
/// let bytes = message.encode_to_vec();
/// ```
pub trait Encode {
    /// Encodes the message to a buffer without a length delimiter.
    ///
    /// This method will panic if the buffer has insufficient capacity.
    ///
    /// Meant to be used only by `Encode` implementations.
    #[doc(hidden)]
    fn encode_raw(&self, buf: &mut impl BufMut);

    /// Returns the encoded length of the message without a length delimiter.
    fn encoded_len(&self) -> usize;

    /// Encodes the message to a buffer.
    ///
    /// An error will be returned if the buffer does not have sufficient capacity.
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        let required = self.encoded_len();
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::new(required, remaining));
        }

        self.encode_raw(buf);
        Ok(())
    }

    /// Encodes the message to a newly allocated buffer.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_raw(&mut buf);
        buf
    }

    /// Encodes the message with a length-delimiter to a buffer.
    ///
    /// An error will be returned if the buffer does not have sufficient capacity.
    fn encode_length_delimited(&self, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        let len = self.encoded_len();
        let required = len + encoded_len_varint(len as u64);
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::new(required, remaining));
        }
        encode_varint(len as u64, buf);
        self.encode_raw(buf);
        Ok(())
    }

    /// Encodes the message with a length-delimiter to a newly allocated buffer.
    fn encode_length_delimited_to_vec(&self) -> Vec<u8> {
        let len = self.encoded_len();
        let mut buf = Vec::with_capacity(len + encoded_len_varint(len as u64));

        encode_varint(len as u64, &mut buf);
        self.encode_raw(&mut buf);
        buf
    }
}

const SIZE_UNKNOWN: usize = usize::MAX;

/// A lazily computed encoded length. Racing computations store the same value.
struct CachedSize(AtomicUsize);

impl CachedSize {
    const fn new() -> CachedSize {
        CachedSize(AtomicUsize::new(SIZE_UNKNOWN))
    }

    fn get(&self) -> Option<usize> {
        match self.0.load(Ordering::Relaxed) {
            SIZE_UNKNOWN => None,
            size => Some(size),
        }
    }

    fn set(&self, size: usize) {
        self.0.store(size, Ordering::Relaxed);
    }
}

impl Clone for CachedSize {
    fn clone(&self) -> CachedSize {
        CachedSize(AtomicUsize::new(self.0.load(Ordering::Relaxed)))
    }
}

/// An immutable message of a type known only at runtime.
///
/// Messages are produced by [`MessageBuilder::build`] or by parsing. Two messages are equal
/// when they have the same descriptor, the same set fields and the same unknown fields.
#[derive(Clone)]
pub struct DynamicMessage {
    desc: MessageDescriptor,
    fields: FieldSet,
    unknown: UnknownFieldSet,
    cached_size: CachedSize,
}

impl DynamicMessage {
    /// The empty message of type `desc`.
    pub fn new(desc: MessageDescriptor) -> DynamicMessage {
        DynamicMessage {
            desc,
            fields: FieldSet::new(),
            unknown: UnknownFieldSet::new(),
            cached_size: CachedSize::new(),
        }
    }

    /// The empty message of type `desc`, which unset message fields of that type report.
    pub fn default_instance(desc: &MessageDescriptor) -> DynamicMessage {
        DynamicMessage::new(desc.clone())
    }

    pub fn builder(desc: MessageDescriptor) -> MessageBuilder {
        MessageBuilder::new(desc)
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.desc
    }

    /// Returns `true` if `field` is set. Repeated fields are set while non-empty.
    ///
    /// # Panics
    ///
    /// Panics if `field` belongs to a different message type.
    pub fn has_field(&self, field: &FieldDescriptor) -> bool {
        check_field(&self.desc, field);
        self.fields.has(field)
    }

    /// The value of `field`, or its [default](FieldDescriptor::default_value) when unset.
    ///
    /// # Panics
    ///
    /// Panics if `field` belongs to a different message type.
    pub fn get_field(&self, field: &FieldDescriptor) -> Cow<'_, Value> {
        check_field(&self.desc, field);
        get_field(&self.fields, field)
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<Cow<'_, Value>> {
        let field = self.desc.get_field_by_name(name)?;
        Some(get_field(&self.fields, &field))
    }

    pub fn repeated_field_count(&self, field: &FieldDescriptor) -> usize {
        check_field(&self.desc, field);
        repeated_field_count(&self.fields, field)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get_repeated_field(&self, field: &FieldDescriptor, index: usize) -> &Value {
        check_field(&self.desc, field);
        get_repeated_field(&self.fields, field, index)
    }

    /// The set member of `oneof`, if any.
    pub fn which_oneof(&self, oneof: &OneofDescriptor) -> Option<FieldDescriptor> {
        oneof.fields().find(|field| self.fields.has(field))
    }

    /// Set fields in ascending field-number order, extensions included.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.fields.iter()
    }

    pub fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown
    }

    /// Returns `true` if all required fields are set, recursively through message fields.
    pub fn is_initialized(&self) -> bool {
        self.fields.is_initialized(&self.desc)
    }

    /// Paths of missing required fields, such as `child.items[2].id` or `(pkg.ext).id`.
    pub fn find_initialization_errors(&self) -> Vec<String> {
        let mut missing = Vec::new();
        self.find_initialization_errors_into("", &mut missing);
        missing
    }

    pub(crate) fn find_initialization_errors_into(&self, prefix: &str, out: &mut Vec<String>) {
        self.fields.find_initialization_errors(&self.desc, prefix, out);
    }

    /// A builder holding a copy of this message's contents.
    pub fn to_builder(&self) -> MessageBuilder {
        self.clone().into_builder()
    }

    pub fn into_builder(self) -> MessageBuilder {
        MessageBuilder {
            desc: self.desc,
            fields: self.fields,
            unknown: self.unknown,
        }
    }

    /// Merges `other` into `self` in place. Only called on values the caller owns exclusively.
    pub(crate) fn merge_in_place(&mut self, other: &DynamicMessage) {
        assert_eq!(
            self.desc, other.desc,
            "cannot merge messages of different types"
        );
        self.fields.merge_from(&other.fields);
        self.unknown.merge_from(&other.unknown);
        self.cached_size = CachedSize::new();
    }

    /// Writes the message body: fields in ascending number order, then unknown fields.
    pub fn write_to<B: BufMut>(&self, writer: &mut CodedWriter<B>) {
        let message_set = self.desc.is_message_set();
        self.fields.write_to(writer, message_set);
        if message_set {
            self.unknown.write_as_message_set_to(writer);
        } else {
            self.unknown.write_to(writer);
        }
    }

    /// Writes the message preceded by its length as a varint.
    #[cfg(feature = "std")]
    pub fn write_delimited_to(&self, mut writer: impl std::io::Write) -> std::io::Result<()> {
        writer.write_all(&self.encode_length_delimited_to_vec())
    }

    /// Parses a complete message from `data`, treating extensions as unknown fields.
    pub fn parse_from(desc: MessageDescriptor, data: &[u8]) -> Result<DynamicMessage, DecodeError> {
        DynamicMessage::parse_from_with_registry(desc, data, ExtensionRegistry::empty())
    }

    pub fn parse_from_with_registry(
        desc: MessageDescriptor,
        data: &[u8],
        registry: &ExtensionRegistry,
    ) -> Result<DynamicMessage, DecodeError> {
        let mut reader = CodedReader::new(data);
        DynamicMessage::parse_from_reader(desc, &mut reader, registry)
    }

    /// Parses a message from the rest of `reader`'s input, then checks required fields.
    ///
    /// A message with missing required fields fails with a [`DecodeError`] for which
    /// [`is_uninitialized`](DecodeError::is_uninitialized) holds; every other failure means the
    /// bytes were malformed.
    pub fn parse_from_reader(
        desc: MessageDescriptor,
        reader: &mut CodedReader<'_>,
        registry: &ExtensionRegistry,
    ) -> Result<DynamicMessage, DecodeError> {
        let mut builder = MessageBuilder::new(desc);
        builder.merge_from_reader(reader, registry)?;
        reader.check_last_tag_was(0)?;
        builder
            .check_initialized()
            .map_err(UninitializedMessageError::into_decode_error)?;
        Ok(builder.build_partial())
    }

    /// Parses a complete message from `data` without checking required fields.
    pub fn parse_partial_from(
        desc: MessageDescriptor,
        data: &[u8],
        registry: &ExtensionRegistry,
    ) -> Result<DynamicMessage, DecodeError> {
        let mut builder = MessageBuilder::new(desc);
        builder.merge_from_slice(data, registry)?;
        Ok(builder.build_partial())
    }

    /// Parses a message from a stream, reading to its end.
    #[cfg(feature = "std")]
    pub fn parse_from_read(
        desc: MessageDescriptor,
        read: impl std::io::Read,
        registry: &ExtensionRegistry,
    ) -> Result<DynamicMessage, DecodeError> {
        let mut reader = CodedReader::from_read(read);
        DynamicMessage::parse_from_reader(desc, &mut reader, registry)
    }

    /// Parses one length-prefixed message from a stream, leaving the stream positioned after
    /// it. Returns `None` if the stream is already at its end.
    #[cfg(feature = "std")]
    pub fn parse_delimited_from<R: std::io::Read>(
        desc: MessageDescriptor,
        read: &mut R,
        registry: &ExtensionRegistry,
    ) -> Result<Option<DynamicMessage>, DecodeError> {
        use crate::error::DecodeErrorKind;
        use std::io::Read;

        let mut byte = [0u8];
        loop {
            match read.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }

        let mut length = u64::from(byte[0] & 0x7F);
        let mut count = 1;
        while byte[0] >= 0x80 {
            if count == crate::encoding::MAX_VARINT_LEN {
                return Err(DecodeError::new(DecodeErrorKind::MalformedVarint));
            }
            read.read_exact(&mut byte)?;
            length |= u64::from(byte[0] & 0x7F) << (7 * count);
            count += 1;
        }
        let length = length as u32 as i32;
        if length < 0 {
            return Err(DecodeError::new(DecodeErrorKind::NegativeLength));
        }

        let mut reader = CodedReader::from_read(read.by_ref().take(length as u64));
        let message = DynamicMessage::parse_from_reader(desc, &mut reader, registry)?;
        if reader.total_bytes_read() != length as usize {
            return Err(DecodeError::new(DecodeErrorKind::Truncated));
        }
        Ok(Some(message))
    }
}

impl Encode for DynamicMessage {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        self.write_to(&mut CodedWriter::new(buf));
    }

    /// Computed once per message and cached.
    fn encoded_len(&self) -> usize {
        if let Some(len) = self.cached_size.get() {
            return len;
        }
        let len = if self.desc.is_message_set() {
            self.fields.encoded_len(true) + self.unknown.message_set_encoded_len()
        } else {
            self.fields.encoded_len(false) + self.unknown.encoded_len()
        };
        self.cached_size.set(len);
        len
    }
}

impl Encode for UnknownFieldSet {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        self.write_to(&mut CodedWriter::new(buf));
    }

    fn encoded_len(&self) -> usize {
        UnknownFieldSet::encoded_len(self)
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.desc == other.desc && self.fields == other.fields && self.unknown == other.unknown
    }
}

impl Eq for DynamicMessage {}

impl Hash for DynamicMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.desc.hash(state);
        self.fields.hash(state);
        self.unknown.hash(state);
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(self.desc.full_name());
        for (field, value) in self.fields.iter() {
            if field.is_extension() {
                debug.field(field.full_name(), value);
            } else {
                debug.field(field.name(), value);
            }
        }
        if !self.unknown.is_empty() {
            debug.field("unknown_fields", &self.unknown);
        }
        debug.finish()
    }
}

/// A mutable message under construction.
///
/// Setters panic when handed a field of another message type or a value of the wrong kind:
/// those are programming errors rather than bad input.
#[derive(Clone, Debug)]
pub struct MessageBuilder {
    desc: MessageDescriptor,
    fields: FieldSet,
    unknown: UnknownFieldSet,
}

impl MessageBuilder {
    pub fn new(desc: MessageDescriptor) -> MessageBuilder {
        MessageBuilder {
            desc,
            fields: FieldSet::new(),
            unknown: UnknownFieldSet::new(),
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.desc
    }

    pub fn has_field(&self, field: &FieldDescriptor) -> bool {
        check_field(&self.desc, field);
        self.fields.has(field)
    }

    pub fn get_field(&self, field: &FieldDescriptor) -> Cow<'_, Value> {
        check_field(&self.desc, field);
        get_field(&self.fields, field)
    }

    pub fn repeated_field_count(&self, field: &FieldDescriptor) -> usize {
        check_field(&self.desc, field);
        repeated_field_count(&self.fields, field)
    }

    pub fn get_repeated_field(&self, field: &FieldDescriptor, index: usize) -> &Value {
        check_field(&self.desc, field);
        get_repeated_field(&self.fields, field, index)
    }

    pub fn which_oneof(&self, oneof: &OneofDescriptor) -> Option<FieldDescriptor> {
        oneof.fields().find(|field| self.fields.has(field))
    }

    pub fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown
    }

    /// Sets `field`, clearing any other member of its oneof. Repeated fields take a
    /// [`Value::List`] and replace the whole list.
    ///
    /// # Panics
    ///
    /// Panics if `field` belongs to another message type or `value` does not fit it.
    pub fn set_field(&mut self, field: &FieldDescriptor, value: Value) -> &mut MessageBuilder {
        check_field(&self.desc, field);
        check_value(field, &value);
        self.fields.set(field.clone(), value);
        self
    }

    /// # Panics
    ///
    /// Panics if the message has no field called `name`, or as [`set_field`](Self::set_field).
    pub fn set_field_by_name(&mut self, name: &str, value: Value) -> &mut MessageBuilder {
        let field = match self.desc.get_field_by_name(name) {
            Some(field) => field,
            None => panic!("{} has no field {name}", self.desc.full_name()),
        };
        self.set_field(&field, value)
    }

    /// Appends an element to a repeated field.
    pub fn add_repeated_field(&mut self, field: &FieldDescriptor, value: Value) -> &mut MessageBuilder {
        check_field(&self.desc, field);
        assert!(field.is_repeated(), "{} is not repeated", field.full_name());
        check_element(field, &value);
        self.fields.list_mut(field).push(value);
        self
    }

    /// Replaces one element of a repeated field.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set_repeated_field(
        &mut self,
        field: &FieldDescriptor,
        index: usize,
        value: Value,
    ) -> &mut MessageBuilder {
        check_field(&self.desc, field);
        assert!(field.is_repeated(), "{} is not repeated", field.full_name());
        check_element(field, &value);
        let len = repeated_field_count(&self.fields, field);
        assert!(
            index < len,
            "index {index} out of bounds for {} of length {len}",
            field.full_name()
        );
        self.fields.list_mut(field)[index] = value;
        self
    }

    pub fn clear_field(&mut self, field: &FieldDescriptor) -> &mut MessageBuilder {
        check_field(&self.desc, field);
        self.fields.take(field);
        self
    }

    /// Clears whichever member of `oneof` is set.
    pub fn clear_oneof(&mut self, oneof: &OneofDescriptor) -> &mut MessageBuilder {
        assert_eq!(
            oneof.containing_message(),
            self.desc,
            "{} is not a oneof of {}",
            oneof.full_name(),
            self.desc.full_name()
        );
        for field in oneof.fields() {
            self.fields.take(&field);
        }
        self
    }

    /// Clears all fields, known and unknown.
    pub fn clear(&mut self) -> &mut MessageBuilder {
        self.fields.clear();
        self.unknown.clear();
        self
    }

    pub fn set_unknown_fields(&mut self, unknown: UnknownFieldSet) -> &mut MessageBuilder {
        self.unknown = unknown;
        self
    }

    pub fn merge_unknown_fields(&mut self, unknown: &UnknownFieldSet) -> &mut MessageBuilder {
        self.unknown.merge_from(unknown);
        self
    }

    /// Merges `other` into this builder: singular scalars overwrite, singular messages merge
    /// recursively (or are adopted when unset), repeated fields and unknown fields concatenate.
    ///
    /// # Panics
    ///
    /// Panics if `other` has a different message type.
    pub fn merge_from(&mut self, other: &DynamicMessage) -> &mut MessageBuilder {
        assert_eq!(
            self.desc, other.desc,
            "cannot merge messages of different types"
        );
        self.fields.merge_from(&other.fields);
        self.unknown.merge_from(&other.unknown);
        self
    }

    /// Merges fields read from `reader` until its input or current limit ends, or an
    /// end-group tag is read. Callers check which with
    /// [`CodedReader::check_last_tag_was`].
    pub fn merge_from_reader(
        &mut self,
        reader: &mut CodedReader<'_>,
        registry: &ExtensionRegistry,
    ) -> Result<(), DecodeError> {
        loop {
            let tag = reader.read_tag()?;
            if tag == 0 || !self.merge_field_from(tag, reader, registry)? {
                return Ok(());
            }
        }
    }

    /// Merges a complete encoded message.
    pub fn merge_from_slice(
        &mut self,
        data: &[u8],
        registry: &ExtensionRegistry,
    ) -> Result<(), DecodeError> {
        let mut reader = CodedReader::new(data);
        self.merge_from_reader(&mut reader, registry)?;
        reader.check_last_tag_was(0)
    }

    /// Merges the value of a field whose tag was just read. Returns `false` if the tag was an
    /// end-group tag.
    pub fn merge_field_from(
        &mut self,
        tag: u32,
        reader: &mut CodedReader<'_>,
        registry: &ExtensionRegistry,
    ) -> Result<bool, DecodeError> {
        if tag == MESSAGE_SET_ITEM_TAG && self.desc.is_message_set() {
            self.merge_message_set_item(reader, registry)?;
            return Ok(true);
        }

        let number = tag_field_number(tag);
        let field = if self.desc.is_extension_number(number) {
            registry.find_by_number(&self.desc, number).cloned()
        } else {
            self.desc.get_field(number)
        };
        let field = match field {
            Some(field) => field,
            None => return self.unknown.merge_field_from(tag, reader),
        };

        let wire_type = tag_wire_type(tag)?;
        let kind = field.kind();
        let packed = field.is_packable() && wire_type == WireType::LengthDelimited;
        if !packed && wire_type != kind.wire_type() {
            log::trace!(
                "{}: wire type {wire_type:?} does not match {kind:?}, keeping as unknown",
                field.full_name()
            );
            return self.unknown.merge_field_from(tag, reader);
        }

        self.merge_known_field(&field, &kind, packed, reader, registry)
            .map_err(|mut error| {
                error.push(self.desc.name(), field.name());
                error
            })?;
        Ok(true)
    }

    fn merge_known_field(
        &mut self,
        field: &FieldDescriptor,
        kind: &Kind,
        packed: bool,
        reader: &mut CodedReader<'_>,
        registry: &ExtensionRegistry,
    ) -> Result<(), DecodeError> {
        if packed {
            let length = reader.read_length()?;
            let old_limit = reader.push_limit(length)?;
            while !reader.is_at_end()? {
                let value = Value::read_scalar(kind, reader)?;
                self.store_scalar(field, kind, value);
            }
            reader.pop_limit(old_limit);
            return Ok(());
        }

        match kind {
            Kind::Message(desc) => self.merge_message_field(field, desc, |builder| {
                reader.read_message(|reader| builder.merge_from_reader(reader, registry))
            }),
            Kind::Group(desc) => self.merge_message_field(field, desc, |builder| {
                reader.read_group(field.number(), |reader| {
                    builder.merge_from_reader(reader, registry)
                })
            }),
            _ => {
                let value = Value::read_scalar(kind, reader)?;
                self.store_scalar(field, kind, value);
                Ok(())
            }
        }
    }

    /// Stores a parsed scalar. Enum numbers the enum does not define go to the unknown fields
    /// as varints.
    fn store_scalar(&mut self, field: &FieldDescriptor, kind: &Kind, value: Value) {
        if let (Kind::Enum(desc), Value::EnumNumber(number)) = (kind, &value) {
            if desc.get_value(*number).is_none() {
                log::trace!(
                    "{}: {number} is not a value of {}, keeping as unknown",
                    field.full_name(),
                    desc.full_name()
                );
                self.unknown
                    .add_varint(field.number(), *number as i64 as u64);
                return;
            }
        }
        if field.is_repeated() {
            self.fields.list_mut(field).push(value);
        } else {
            self.fields.set(field.clone(), value);
        }
    }

    /// Reads a message value with `read`. A singular field's existing value is the starting
    /// point, so the new bytes merge into it.
    fn merge_message_field(
        &mut self,
        field: &FieldDescriptor,
        desc: &MessageDescriptor,
        read: impl FnOnce(&mut MessageBuilder) -> Result<(), DecodeError>,
    ) -> Result<(), DecodeError> {
        let existing = if field.is_repeated() {
            None
        } else {
            self.fields.take(field)
        };
        let mut builder = match existing {
            Some(Value::Message(message)) => message.into_builder(),
            _ => MessageBuilder::new(desc.clone()),
        };
        read(&mut builder)?;
        let message = Value::Message(builder.build_partial());
        if field.is_repeated() {
            self.fields.list_mut(field).push(message);
        } else {
            self.fields.set(field.clone(), message);
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.fields.is_initialized(&self.desc)
    }

    pub fn find_initialization_errors(&self) -> Vec<String> {
        let mut missing = Vec::new();
        self.fields
            .find_initialization_errors(&self.desc, "", &mut missing);
        missing
    }

    /// Fails with the paths of any missing required fields.
    pub fn check_initialized(&self) -> Result<(), UninitializedMessageError> {
        if self.is_initialized() {
            return Ok(());
        }
        Err(UninitializedMessageError::new(
            self.find_initialization_errors(),
        ))
    }

    /// Builds the message.
    ///
    /// # Panics
    ///
    /// Panics if a required field is missing. Use [`build_partial`](Self::build_partial) to
    /// skip the check.
    pub fn build(self) -> DynamicMessage {
        if let Err(error) = self.check_initialized() {
            panic!("{error}");
        }
        self.build_partial()
    }

    /// Builds the message without checking required fields.
    pub fn build_partial(self) -> DynamicMessage {
        DynamicMessage {
            desc: self.desc,
            fields: self.fields,
            unknown: self.unknown,
            cached_size: CachedSize::new(),
        }
    }
}

fn check_field(desc: &MessageDescriptor, field: &FieldDescriptor) {
    assert!(
        field.containing_message() == *desc,
        "{} is not a field of {}",
        field.full_name(),
        desc.full_name()
    );
}

fn check_value(field: &FieldDescriptor, value: &Value) {
    assert!(
        value.is_valid_for_field(field),
        "{value:?} is not a valid value for {}",
        field.full_name()
    );
}

fn check_element(field: &FieldDescriptor, value: &Value) {
    assert!(
        value.is_valid(&field.kind()),
        "{value:?} is not a valid element for {}",
        field.full_name()
    );
}

fn get_field<'a>(fields: &'a FieldSet, field: &FieldDescriptor) -> Cow<'a, Value> {
    match fields.get(field) {
        Some(value) => Cow::Borrowed(value),
        None => Cow::Owned(field.default_value()),
    }
}

fn repeated_field_count(fields: &FieldSet, field: &FieldDescriptor) -> usize {
    match fields.get(field) {
        Some(Value::List(values)) => values.len(),
        _ => 0,
    }
}

fn get_repeated_field<'a>(fields: &'a FieldSet, field: &FieldDescriptor, index: usize) -> &'a Value {
    match fields.get(field) {
        Some(Value::List(values)) => &values[index],
        _ => panic!(
            "index {index} out of bounds for empty field {}",
            field.full_name()
        ),
    }
}
