//! Decoding of MessageSet items.
//!
//! An item is a group numbered [`MESSAGE_SET_ITEM`] holding a type id and a message payload, in
//! either order. The type id names an extension of the containing MessageSet type.

use crate::bytestring::ByteString;
use crate::descriptor::{FieldDescriptor, Kind};
use crate::encoding::{MESSAGE_SET_ITEM, MESSAGE_SET_MESSAGE_TAG, MESSAGE_SET_TYPE_ID_TAG};
use crate::error::DecodeError;
use crate::extension::ExtensionRegistry;
use crate::reader::{CodedReader, MessageSetDecoding};

use super::MessageBuilder;

impl MessageBuilder {
    /// Merges one item whose start-group tag was just read.
    ///
    /// With [`MessageSetDecoding::Streaming`] a payload whose type id is already known is parsed
    /// straight from the input. Otherwise payloads are buffered, concatenated, and parsed once
    /// the item ends. Both produce the same message. Payloads for type ids with no registered
    /// message extension are kept as unknown length-delimited fields numbered by type id.
    pub(super) fn merge_message_set_item(
        &mut self,
        reader: &mut CodedReader<'_>,
        registry: &ExtensionRegistry,
    ) -> Result<(), DecodeError> {
        reader
            .read_group(MESSAGE_SET_ITEM, |reader| {
                let mut type_id = 0;
                let mut extension = None;
                let mut pending: Option<ByteString> = None;

                loop {
                    let tag = reader.read_tag()?;
                    match tag {
                        0 => break,
                        MESSAGE_SET_TYPE_ID_TAG => {
                            type_id = reader.read_uint32()?;
                            extension = self.message_set_extension(type_id, registry);
                        }
                        MESSAGE_SET_MESSAGE_TAG => {
                            let streaming = pending.is_none()
                                && reader.message_set_decoding() == MessageSetDecoding::Streaming;
                            match extension.as_ref().filter(|_| streaming) {
                                Some(extension) => {
                                    self.merge_item_payload(extension, |builder| {
                                        reader.read_message(|reader| {
                                            builder.merge_from_reader(reader, registry)
                                        })
                                    })?;
                                }
                                None => {
                                    let bytes = reader.read_bytes()?;
                                    pending = Some(match pending.take() {
                                        Some(earlier) => earlier.concat(&bytes),
                                        None => bytes,
                                    });
                                }
                            }
                        }
                        _ => {
                            if !reader.skip_field(tag)? {
                                break;
                            }
                        }
                    }
                }

                let bytes = match pending {
                    Some(bytes) if type_id != 0 => bytes,
                    _ => return Ok(()),
                };
                match extension {
                    Some(extension) => self.merge_item_payload(&extension, |builder| {
                        reader.read_buffered_message(bytes.as_slice(), |reader| {
                            builder.merge_from_reader(reader, registry)
                        })
                    }),
                    None => {
                        log::trace!(
                            "{}: no extension for type id {type_id}, keeping as unknown",
                            self.desc.full_name()
                        );
                        self.unknown.add_length_delimited(type_id, bytes);
                        Ok(())
                    }
                }
            })
            .map_err(|mut error| {
                error.push(self.desc.name(), "message_set_item");
                error
            })
    }

    /// The singular message extension registered for `type_id`, if any.
    fn message_set_extension(
        &self,
        type_id: u32,
        registry: &ExtensionRegistry,
    ) -> Option<FieldDescriptor> {
        if type_id == 0 {
            return None;
        }
        registry
            .find_by_number(&self.desc, type_id)
            .filter(|extension| {
                !extension.is_repeated() && matches!(extension.kind(), Kind::Message(_))
            })
            .cloned()
    }

    fn merge_item_payload(
        &mut self,
        extension: &FieldDescriptor,
        read: impl FnOnce(&mut MessageBuilder) -> Result<(), DecodeError>,
    ) -> Result<(), DecodeError> {
        match extension.kind() {
            Kind::Message(desc) => self.merge_message_field(extension, &desc, read),
            _ => Ok(()),
        }
    }
}
