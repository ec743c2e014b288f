//! Value encoding/decoding.
//!
//! A value is framed as `[type id: u8][body]`. Bodies are self-delimiting:
//!
//! - BYTES: varint length, raw bytes.
//! - FLOAT_ARRAY: bool `is_packed`, then
//!   - packed: varint dimension, varint byte length, `dimension * 4` little-endian bytes;
//!   - primitive: generic float array (varint count, big-endian f32s).
//!
//! The packed body carries its dimension explicitly while the primitive body
//! relies on the generic array's own count. Both layouts are part of the wire
//! format and must not be unified.

use std::sync::Arc;

use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_BYTES_LEN, MAX_DIMENSION};
use crate::model::{
    ByteArray, BytesValue, ExtraFieldValue, FloatArrayValue, PackedFloatArray, PrimitiveFloatArray,
    ValueType,
};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a value: reads the type id, then the matching body.
pub fn decode_value(reader: &mut Reader<'_>) -> Result<ExtraFieldValue, DecodeError> {
    let id = reader.read_byte("value.type")?;
    match ValueType::try_from(id)? {
        ValueType::Bytes => decode_bytes_body(reader).map(ExtraFieldValue::Bytes),
        ValueType::FloatArray => decode_float_array_body(reader).map(ExtraFieldValue::FloatArray),
    }
}

/// Decodes exactly one value from `input`, rejecting trailing bytes.
pub fn decode_value_from_slice(input: &[u8]) -> Result<ExtraFieldValue, DecodeError> {
    let mut reader = Reader::new(input);
    let value = decode_value(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            context: "value",
            count: reader.remaining_len(),
        });
    }
    Ok(value)
}

/// Decodes a BYTES body.
pub fn decode_bytes_body(reader: &mut Reader<'_>) -> Result<BytesValue, DecodeError> {
    let bytes = reader.read_bytes_prefixed(MAX_BYTES_LEN, "bytes")?;
    Ok(BytesValue::from(bytes))
}

/// Decodes a FLOAT_ARRAY body.
pub fn decode_float_array_body(reader: &mut Reader<'_>) -> Result<FloatArrayValue, DecodeError> {
    if reader.read_bool("float_array.packed")? {
        let dimension = reader.read_len(MAX_DIMENSION, "float_array.dimension")?;
        let packed = reader.read_bytes_prefixed(MAX_BYTES_LEN, "float_array.packed_bytes")?;
        let array = ByteArray::from(packed);
        let value = PackedFloatArray::from_packed_bytes(Arc::new(array), dimension)?;
        Ok(FloatArrayValue::Packed(value))
    } else {
        let values = reader.read_f32_array(MAX_DIMENSION, "float_array.values")?;
        Ok(FloatArrayValue::Primitive(PrimitiveFloatArray::new(values)))
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a value: type id, then body.
pub fn encode_value(writer: &mut Writer, value: &ExtraFieldValue) -> Result<(), EncodeError> {
    writer.write_byte(value.value_type().id());
    match value {
        ExtraFieldValue::Bytes(v) => encode_bytes_body(writer, v),
        ExtraFieldValue::FloatArray(v) => encode_float_array_body(writer, v),
    }
}

/// Encodes one value into a new buffer.
pub fn encode_value_to_vec(value: &ExtraFieldValue) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(16 + value.size() * 4);
    encode_value(&mut writer, value)?;
    Ok(writer.into_bytes())
}

/// Encodes a BYTES body. Composite sources are written segment by segment.
pub fn encode_bytes_body(writer: &mut Writer, value: &BytesValue) -> Result<(), EncodeError> {
    check_len("bytes", value.size(), MAX_BYTES_LEN)?;
    writer.write_byte_source(&**value.bytes());
    Ok(())
}

/// Encodes a FLOAT_ARRAY body.
pub fn encode_float_array_body(writer: &mut Writer, value: &FloatArrayValue) -> Result<(), EncodeError> {
    check_len("float_array.dimension", value.dimension(), MAX_DIMENSION)?;
    writer.write_bool(value.is_packed());
    match value {
        FloatArrayValue::Packed(v) => {
            writer.write_varint(v.dimension() as u64);
            writer.write_byte_source(&**v.packed_bytes());
        }
        FloatArrayValue::Primitive(v) => {
            writer.write_f32_array(v.as_float_sequence());
        }
    }
    Ok(())
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), EncodeError> {
    if len > max {
        return Err(EncodeError::LengthExceedsLimit { field, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::model::{ByteSource, CompositeBytes, SharedBytes};

    fn roundtrip(value: &ExtraFieldValue) -> ExtraFieldValue {
        let bytes = encode_value_to_vec(value).unwrap();
        decode_value_from_slice(&bytes).unwrap()
    }

    fn pseudo_floats(n: usize) -> Vec<f32> {
        (0..n).map(|i| (i as f32 - 500.0) * 0.37).collect()
    }

    #[test]
    fn test_bytes_roundtrip() {
        let value = ExtraFieldValue::from(BytesValue::from(vec![1u8, 2, 3, 4]));
        let decoded = roundtrip(&value);

        assert_eq!(decoded.value_type(), ValueType::Bytes);
        assert_eq!(decoded.size(), 4);
        assert_eq!(decoded.as_bytes().unwrap().to_vec()[0], 1);
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_bytes_roundtrip_lengths() {
        for len in [0usize, 1, 4, 4096] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let value = ExtraFieldValue::from(BytesValue::from(payload.clone()));
            let decoded = roundtrip(&value);
            assert_eq!(decoded.size(), len);
            assert_eq!(decoded.as_bytes().unwrap().to_vec(), payload);
        }
    }

    #[test]
    fn test_bytes_composite_roundtrip() {
        let all = vec![1u8, 2, 3, 4, 5, 6];
        let parts: Vec<SharedBytes> = vec![
            Arc::new(ByteArray::from(&all[..2])),
            Arc::new(ByteArray::from(&all[2..])),
        ];
        let value = ExtraFieldValue::from(BytesValue::new(Arc::new(CompositeBytes::of(parts))));

        let decoded = roundtrip(&value);
        assert_eq!(decoded.size(), 6);
        assert_eq!(decoded.as_bytes().unwrap().to_vec(), all);
    }

    #[test]
    fn test_bytes_wire_layout() {
        let value = ExtraFieldValue::from(BytesValue::from(vec![10u8, 11]));
        assert_eq!(encode_value_to_vec(&value).unwrap(), vec![0, 2, 10, 11]);
    }

    #[test]
    fn test_primitive_float_array_roundtrip() {
        let value = ExtraFieldValue::from(PrimitiveFloatArray::new(vec![10.5f32, 20.25]));
        let decoded = roundtrip(&value);

        let fav = decoded.as_float_array().unwrap();
        assert_eq!(decoded.value_type(), ValueType::FloatArray);
        assert!(!fav.is_packed());
        assert_eq!(fav.dimension(), 2);
        assert_eq!(fav.get(0).unwrap(), 10.5);
        assert_eq!(fav.get(1).unwrap(), 20.25);
    }

    #[test]
    fn test_float_array_roundtrip_dimensions() {
        for dim in [0usize, 1, 2, 1000] {
            let floats = pseudo_floats(dim);
            let values = [
                ExtraFieldValue::from(PrimitiveFloatArray::new(floats.clone())),
                ExtraFieldValue::from(PackedFloatArray::from_floats(&floats)),
            ];
            for value in values {
                let decoded = roundtrip(&value);
                let expected: Vec<u32> = floats.iter().map(|f| f.to_bits()).collect();
                let actual: Vec<u32> = decoded
                    .as_float_array()
                    .unwrap()
                    .as_float_sequence()
                    .iter()
                    .map(|f| f.to_bits())
                    .collect();
                assert_eq!(actual, expected, "dim={}", dim);
                assert_eq!(decoded, value);
            }
        }
    }

    #[test]
    fn test_packed_wire_layout() {
        let value = ExtraFieldValue::from(PackedFloatArray::from_floats(&[1.0]));
        assert_eq!(
            encode_value_to_vec(&value).unwrap(),
            vec![1, 1, 1, 4, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn test_primitive_wire_layout() {
        let value = ExtraFieldValue::from(PrimitiveFloatArray::new(vec![1.0f32]));
        assert_eq!(
            encode_value_to_vec(&value).unwrap(),
            vec![1, 0, 1, 0x3F, 0x80, 0x00, 0x00]
        );
    }

    #[test]
    fn test_packed_decoded_keeps_representation() {
        let value = ExtraFieldValue::from(PackedFloatArray::from_floats(&[1.5, -2.0, 3.25]));
        let decoded = roundtrip(&value);
        let fav = decoded.as_float_array().unwrap();
        assert!(fav.is_packed());
        assert_eq!(fav.packed_bytes().unwrap().len(), 12);
        assert_eq!(fav.get(2).unwrap(), 3.25);
    }

    #[test]
    fn test_special_floats_are_bit_preserving() {
        let floats = vec![f32::NAN, f32::INFINITY, -0.0, f32::MIN_POSITIVE, f32::from_bits(0x7F80_0001)];
        for value in [
            ExtraFieldValue::from(PrimitiveFloatArray::new(floats.clone())),
            ExtraFieldValue::from(PackedFloatArray::from_floats(&floats)),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn test_unknown_type_id() {
        let data = [42u8, 0];
        let result = decode_value_from_slice(&data);
        assert!(matches!(result, Err(DecodeError::UnknownVariant { id: 42 })));
    }

    #[test]
    fn test_packed_length_mismatch_on_wire() {
        let mut writer = Writer::new();
        writer.write_byte(ValueType::FloatArray.id());
        writer.write_bool(true);
        writer.write_varint(2);
        writer.write_bytes_prefixed(&[0u8; 7]);

        let result = decode_value_from_slice(writer.as_bytes());
        assert!(matches!(
            result,
            Err(DecodeError::InvalidValue(ValueError::MalformedPackedArray {
                dimension: 2,
                expected: Some(8),
                actual: 7
            }))
        ));
    }

    #[test]
    fn test_invalid_packed_flag() {
        let data = [1u8, 2, 0];
        assert!(matches!(
            decode_value_from_slice(&data),
            Err(DecodeError::InvalidBool { value: 2 })
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode_value_to_vec(&BytesValue::from(vec![1u8]).into()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_value_from_slice(&bytes),
            Err(DecodeError::TrailingBytes { count: 1, .. })
        ));
    }

    #[test]
    fn test_truncated_body() {
        let bytes = encode_value_to_vec(&PrimitiveFloatArray::new(vec![1.0f32, 2.0]).into()).unwrap();
        for cut in 0..bytes.len() {
            assert!(decode_value_from_slice(&bytes[..cut]).is_err(), "cut={}", cut);
        }
    }

    #[test]
    fn test_body_reader_consumes_only_its_bytes() {
        let mut writer = Writer::new();
        encode_value(&mut writer, &BytesValue::from(vec![1u8, 2]).into()).unwrap();
        encode_value(&mut writer, &PrimitiveFloatArray::new(vec![3.0f32]).into()).unwrap();

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(decode_value(&mut reader).unwrap().size(), 2);
        assert_eq!(decode_value(&mut reader).unwrap().size(), 1);
        assert!(reader.is_empty());
    }
}
