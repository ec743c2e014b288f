//! Primitive encoding/decoding for the extra field value wire format.
//!
//! Implements varints, booleans, length-prefixed strings and byte runs, and
//! the generic float array (varint count + big-endian 32-bit floats).

use std::sync::Arc;

use crate::error::DecodeError;
use crate::limits::MAX_VARINT_BYTES;
use crate::model::ByteSource;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a boolean byte (0x00 or 0x01).
    #[inline]
    pub fn read_bool(&mut self, context: &'static str) -> Result<bool, DecodeError> {
        match self.read_byte(context)? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            value => Err(DecodeError::InvalidBool { value }),
        }
    }

    /// Reads an unsigned varint (LEB128).
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0;

        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;

            // Check for overflow
            if shift >= 64 || (shift == 63 && value > 1) {
                return Err(DecodeError::VarintOverflow);
            }

            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;

            if i == MAX_VARINT_BYTES - 1 {
                return Err(DecodeError::VarintTooLong);
            }
        }

        Err(DecodeError::VarintTooLong)
    }

    /// Reads a varint length and checks it against `max_len`.
    #[inline]
    pub fn read_len(&mut self, max_len: usize, field: &'static str) -> Result<usize, DecodeError> {
        let raw = self.read_varint(field)?;
        let len = usize::try_from(raw).unwrap_or(usize::MAX);
        if len > max_len {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len,
                max: max_len,
            });
        }
        Ok(len)
    }

    /// Reads a length-prefixed UTF-8 string, borrowed from the input.
    #[inline]
    pub fn read_str(&mut self, max_len: usize, field: &'static str) -> Result<&'a str, DecodeError> {
        let len = self.read_len(max_len, field)?;
        let bytes = self.read_bytes(len, field)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field })
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, max_len: usize, field: &'static str) -> Result<String, DecodeError> {
        self.read_str(max_len, field).map(str::to_string)
    }

    /// Reads a length-prefixed byte run, borrowed from the input.
    pub fn read_bytes_prefixed(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        let len = self.read_len(max_len, field)?;
        self.read_bytes(len, field)
    }

    /// Reads a big-endian f32.
    #[inline]
    pub fn read_f32_be(&mut self, context: &'static str) -> Result<f32, DecodeError> {
        let b = self.read_bytes(4, context)?;
        Ok(f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a generic float array: varint count, then count big-endian f32s.
    pub fn read_f32_array(&mut self, max_len: usize, field: &'static str) -> Result<Arc<[f32]>, DecodeError> {
        let count = self.read_len(max_len, field)?;
        let byte_len = count.checked_mul(4).ok_or(DecodeError::LengthExceedsLimit {
            field,
            len: count,
            max: max_len,
        })?;
        let bytes = self.read_bytes(byte_len, field)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a boolean as 0x00 or 0x01.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    /// Writes an unsigned varint (LEB128).
    #[inline]
    pub fn write_varint(&mut self, mut value: u64) {
        // Use stack buffer to batch writes (faster than multiple push calls)
        let mut buf = [0u8; 10]; // Max 10 bytes for 64-bit varint
        let mut len = 0;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Writes a length-prefixed byte array.
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a length-prefixed byte source, segment by segment.
    pub fn write_byte_source(&mut self, source: &dyn ByteSource) {
        self.write_varint(source.len() as u64);
        self.buf.reserve(source.len());
        for segment in source.segments() {
            self.buf.extend_from_slice(segment);
        }
    }

    /// Writes a big-endian f32.
    #[inline]
    pub fn write_f32_be(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a generic float array: varint count, then big-endian f32s.
    pub fn write_f32_array(&mut self, values: &[f32]) {
        self.write_varint(values.len() as u64);
        self.buf.reserve(values.len() * 4);
        for v in values {
            self.write_f32_be(*v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ByteArray, CompositeBytes, SharedBytes};

    #[test]
    fn test_varint_roundtrip() {
        let test_values = [0u64, 1, 127, 128, 255, 256, 16383, 16384, u64::MAX];

        for v in test_values {
            let mut writer = Writer::new();
            writer.write_varint(v);

            let mut reader = Reader::new(writer.as_bytes());
            let decoded = reader.read_varint("test").unwrap();
            assert_eq!(v, decoded, "failed for {}", v);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_varint_known_encodings() {
        let mut writer = Writer::new();
        writer.write_varint(300);
        assert_eq!(writer.as_bytes(), &[0xAC, 0x02]);
    }

    #[test]
    fn test_varint_too_long() {
        // 11 continuation bytes should fail
        let data = [0x80u8; 11];
        let mut reader = Reader::new(&data);
        let result = reader.read_varint("test");
        assert!(matches!(result, Err(DecodeError::VarintTooLong)));
    }

    #[test]
    fn test_varint_overflow() {
        let mut data = [0xFFu8; 10];
        data[9] = 0x02;
        let mut reader = Reader::new(&data);
        assert!(matches!(reader.read_varint("test"), Err(DecodeError::VarintOverflow)));
    }

    #[test]
    fn test_bool() {
        let mut reader = Reader::new(&[0x00, 0x01, 0x02]);
        assert!(!reader.read_bool("b").unwrap());
        assert!(reader.read_bool("b").unwrap());
        assert!(matches!(reader.read_bool("b"), Err(DecodeError::InvalidBool { value: 2 })));
    }

    #[test]
    fn test_string_roundtrip() {
        let test_strings = ["", "hello", "obj.vec", "unicode: \u{1F600}"];

        for s in test_strings {
            let mut writer = Writer::new();
            writer.write_string(s);

            let mut reader = Reader::new(writer.as_bytes());
            let decoded = reader.read_string(1000, "test").unwrap();
            assert_eq!(s, decoded);
        }
    }

    #[test]
    fn test_string_too_long() {
        let mut writer = Writer::new();
        writer.write_varint(1000); // length
        writer.write_bytes(&[0u8; 1000]);

        let mut reader = Reader::new(writer.as_bytes());
        let result = reader.read_string(100, "test"); // max 100
        assert!(matches!(
            result,
            Err(DecodeError::LengthExceedsLimit { max: 100, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut writer = Writer::new();
        writer.write_bytes_prefixed(&[0xFF, 0xFE]);
        let mut reader = Reader::new(writer.as_bytes());
        assert!(matches!(
            reader.read_str(10, "key"),
            Err(DecodeError::InvalidUtf8 { field: "key" })
        ));
    }

    #[test]
    fn test_huge_length_is_rejected_before_reading() {
        let mut writer = Writer::new();
        writer.write_varint(u64::MAX);
        let mut reader = Reader::new(writer.as_bytes());
        assert!(matches!(
            reader.read_bytes_prefixed(16, "bytes"),
            Err(DecodeError::LengthExceedsLimit { field: "bytes", .. })
        ));
    }

    #[test]
    fn test_unexpected_eof() {
        let data = [0u8; 5];
        let mut reader = Reader::new(&data);
        let result = reader.read_bytes(10, "test");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_byte_source_written_segment_by_segment() {
        let parts: Vec<SharedBytes> = vec![
            Arc::new(ByteArray::from(vec![1u8, 2])),
            Arc::new(ByteArray::from(vec![3u8, 4, 5, 6])),
        ];
        let composite = CompositeBytes::of(parts);

        let mut writer = Writer::new();
        writer.write_byte_source(&composite);
        assert_eq!(writer.as_bytes(), &[6, 1, 2, 3, 4, 5, 6]);

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(reader.read_bytes_prefixed(100, "bytes").unwrap(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_f32_array_is_big_endian() {
        let mut writer = Writer::new();
        writer.write_f32_array(&[1.0, -2.5]);
        assert_eq!(
            writer.as_bytes(),
            &[2, 0x3F, 0x80, 0x00, 0x00, 0xC0, 0x20, 0x00, 0x00]
        );

        let mut reader = Reader::new(writer.as_bytes());
        let values = reader.read_f32_array(10, "floats").unwrap();
        assert_eq!(&values[..], &[1.0, -2.5]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_f32_array_truncated() {
        let mut writer = Writer::new();
        writer.write_varint(3);
        writer.write_f32_be(1.0);
        let mut reader = Reader::new(writer.as_bytes());
        assert!(matches!(
            reader.read_f32_array(10, "floats"),
            Err(DecodeError::UnexpectedEof { context: "floats" })
        ));
    }
}
