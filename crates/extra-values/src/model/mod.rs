//! Data model types for extra field values.
//!
//! This module contains:
//! - Byte sources (contiguous windows and composites)
//! - Value variants (bytes, float arrays) and their wire type ids
//! - The float array family (primitive and packed)
//! - The immutable value bag keyed by field path

pub mod bytes;
pub mod float_array;
pub mod value;
pub mod values;

pub use bytes::{ByteArray, ByteSource, CompositeBytes, SharedBytes};
pub use float_array::{ContiguousBytes, FloatArrayValue, PackedFloatArray, PrimitiveFloatArray};
pub use value::{BytesValue, ExtraFieldValue, ValueType};
pub use values::ExtraFieldValues;
