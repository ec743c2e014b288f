//! Extra field value variants and their wire type ids.
//!
//! An [`ExtraFieldValue`] is a typed value attached to a write request outside
//! the document source. The variant set is closed; each variant has exactly one
//! wire type id.

use std::fmt;
use std::sync::Arc;

use crate::error::DecodeError;
use crate::model::bytes::{content_eq, ByteArray, ByteSource, SharedBytes};
use crate::model::float_array::{FloatArrayValue, PackedFloatArray, PrimitiveFloatArray};

/// Wire type ids of the value variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Bytes = 0,
    FloatArray = 1,
}

impl ValueType {
    /// Creates a ValueType from its wire representation.
    pub fn from_u8(v: u8) -> Option<ValueType> {
        match v {
            0 => Some(ValueType::Bytes),
            1 => Some(ValueType::FloatArray),
            _ => None,
        }
    }

    /// The wire type id.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Upper-case label stored by mappers alongside a value.
    pub fn label(self) -> &'static str {
        match self {
            ValueType::Bytes => "BYTES",
            ValueType::FloatArray => "FLOAT_ARRAY",
        }
    }
}

impl TryFrom<u8> for ValueType {
    type Error = DecodeError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        ValueType::from_u8(id).ok_or(DecodeError::UnknownVariant { id })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque bytes.
#[derive(Debug, Clone)]
pub struct BytesValue {
    bytes: SharedBytes,
}

impl BytesValue {
    /// Wraps a shared byte source.
    pub fn new(bytes: SharedBytes) -> Self {
        Self { bytes }
    }

    /// The underlying byte source.
    pub fn bytes(&self) -> &SharedBytes {
        &self.bytes
    }

    /// Byte length.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Copies the bytes out in read order.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl From<Vec<u8>> for BytesValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(Arc::new(ByteArray::from(bytes)))
    }
}

impl From<&[u8]> for BytesValue {
    fn from(bytes: &[u8]) -> Self {
        Self::new(Arc::new(ByteArray::from(bytes)))
    }
}

impl PartialEq for BytesValue {
    fn eq(&self, other: &Self) -> bool {
        content_eq(&*self.bytes, &*other.bytes)
    }
}

/// A typed value attached to a write request.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraFieldValue {
    /// Opaque bytes.
    Bytes(BytesValue),
    /// 32-bit float array, primitive or packed.
    FloatArray(FloatArrayValue),
}

impl ExtraFieldValue {
    /// Returns the wire type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            ExtraFieldValue::Bytes(_) => ValueType::Bytes,
            ExtraFieldValue::FloatArray(_) => ValueType::FloatArray,
        }
    }

    /// Byte length for bytes, element count for float arrays.
    pub fn size(&self) -> usize {
        match self {
            ExtraFieldValue::Bytes(v) => v.size(),
            ExtraFieldValue::FloatArray(v) => v.dimension(),
        }
    }

    /// Returns the bytes variant, if this is one.
    pub fn as_bytes(&self) -> Option<&BytesValue> {
        match self {
            ExtraFieldValue::Bytes(v) => Some(v),
            ExtraFieldValue::FloatArray(_) => None,
        }
    }

    /// Returns the float array variant, if this is one.
    pub fn as_float_array(&self) -> Option<&FloatArrayValue> {
        match self {
            ExtraFieldValue::FloatArray(v) => Some(v),
            ExtraFieldValue::Bytes(_) => None,
        }
    }
}

impl From<BytesValue> for ExtraFieldValue {
    fn from(v: BytesValue) -> Self {
        ExtraFieldValue::Bytes(v)
    }
}

impl From<FloatArrayValue> for ExtraFieldValue {
    fn from(v: FloatArrayValue) -> Self {
        ExtraFieldValue::FloatArray(v)
    }
}

impl From<PrimitiveFloatArray> for ExtraFieldValue {
    fn from(v: PrimitiveFloatArray) -> Self {
        ExtraFieldValue::FloatArray(v.into())
    }
}

impl From<PackedFloatArray> for ExtraFieldValue {
    fn from(v: PackedFloatArray) -> Self {
        ExtraFieldValue::FloatArray(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bytes::CompositeBytes;

    #[test]
    fn test_type_ids_roundtrip() {
        for t in [ValueType::Bytes, ValueType::FloatArray] {
            assert_eq!(ValueType::from_u8(t.id()), Some(t));
            assert_eq!(ValueType::try_from(t.id()), Ok(t));
        }
        for id in 2..=u8::MAX {
            assert_eq!(ValueType::from_u8(id), None);
            assert_eq!(ValueType::try_from(id), Err(DecodeError::UnknownVariant { id }));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ValueType::Bytes.label(), "BYTES");
        assert_eq!(ValueType::FloatArray.to_string(), "FLOAT_ARRAY");
    }

    #[test]
    fn test_bytes_type_and_size() {
        let v = ExtraFieldValue::from(BytesValue::from(vec![1u8, 2, 3, 4]));
        assert_eq!(v.value_type(), ValueType::Bytes);
        assert_eq!(v.size(), 4);
        assert_eq!(v.as_bytes().unwrap().to_vec(), vec![1, 2, 3, 4]);
        assert!(v.as_float_array().is_none());
    }

    #[test]
    fn test_float_array_size_is_dimension() {
        let primitive = ExtraFieldValue::from(PrimitiveFloatArray::new(vec![1.0f32, 2.0, 3.0]));
        assert_eq!(primitive.value_type(), ValueType::FloatArray);
        assert_eq!(primitive.size(), 3);

        let packed = ExtraFieldValue::from(PackedFloatArray::from_floats(&[1.0, 2.0]));
        assert_eq!(packed.size(), 2);
        assert!(packed.as_float_array().unwrap().is_packed());
        assert!(packed.as_bytes().is_none());
    }

    #[test]
    fn test_bytes_equality_ignores_segmentation() {
        let flat = BytesValue::from(vec![1u8, 2, 3]);
        let parts: Vec<SharedBytes> = vec![
            Arc::new(ByteArray::from(vec![1u8])),
            Arc::new(ByteArray::from(vec![2u8, 3])),
        ];
        let composite = BytesValue::new(Arc::new(CompositeBytes::of(parts)));
        assert_eq!(flat, composite);
        assert_ne!(flat, BytesValue::from(vec![1u8, 2]));
    }
}
