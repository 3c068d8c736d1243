//! The wire-format writer.

use ::bytes::BufMut;

use crate::encoding::{encode_varint, encode_zigzag32, encode_zigzag64, make_tag, WireType};

/// Writes Protobuf wire-format values into a [`BufMut`].
///
/// The writer does not check capacity; callers size the buffer up front from the
/// message's [`encoded_len`](crate::DynamicMessage::encoded_len), as
/// [`DynamicMessage::encode`](crate::DynamicMessage::encode) does.
#[derive(Debug)]
pub struct CodedWriter<B> {
    buf: B,
    written: usize,
}

impl<B: BufMut> CodedWriter<B> {
    pub fn new(buf: B) -> CodedWriter<B> {
        CodedWriter { buf, written: 0 }
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_tag(&mut self, number: u32, wire_type: WireType) {
        self.write_varint(u64::from(make_tag(number, wire_type)));
    }

    pub fn write_varint(&mut self, value: u64) {
        let before = self.buf.remaining_mut();
        encode_varint(value, &mut self.buf);
        self.written += before - self.buf.remaining_mut();
    }

    /// Writes an `int32`. Negative values are sign-extended to ten bytes so `int64` readers
    /// see the same number.
    pub fn write_int32(&mut self, value: i32) {
        self.write_varint(value as i64 as u64);
    }

    pub fn write_int64(&mut self, value: i64) {
        self.write_varint(value as u64);
    }

    pub fn write_uint32(&mut self, value: u32) {
        self.write_varint(u64::from(value));
    }

    pub fn write_uint64(&mut self, value: u64) {
        self.write_varint(value);
    }

    pub fn write_sint32(&mut self, value: i32) {
        self.write_varint(u64::from(encode_zigzag32(value)));
    }

    pub fn write_sint64(&mut self, value: i64) {
        self.write_varint(encode_zigzag64(value));
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_varint(u64::from(value));
    }

    pub fn write_enum(&mut self, value: i32) {
        self.write_int32(value);
    }

    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
        self.written += 4;
    }

    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
        self.written += 8;
    }

    pub fn write_sfixed32(&mut self, value: i32) {
        self.write_fixed32(value as u32);
    }

    pub fn write_sfixed64(&mut self, value: i64) {
        self.write_fixed64(value as u64);
    }

    pub fn write_float(&mut self, value: f32) {
        self.write_fixed32(value.to_bits());
    }

    pub fn write_double(&mut self, value: f64) {
        self.write_fixed64(value.to_bits());
    }

    pub fn write_raw_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
        self.written += data.len();
    }

    /// Writes a length prefix followed by `data`.
    pub fn write_length_delimited(&mut self, data: &[u8]) {
        self.write_varint(data.len() as u64);
        self.write_raw_bytes(data);
    }
}
