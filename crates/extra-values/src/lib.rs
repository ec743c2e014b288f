//! Extra field values: typed out-of-band values for document write requests.
//!
//! A write request can carry, next to its document source, a bag of typed
//! values keyed by field path. This crate provides the value model, the
//! binary wire format used to move bags between nodes, and the interface
//! field mappers use to consume them.
//!
//! # Overview
//!
//! Two value kinds exist:
//! - **Bytes**: opaque byte payloads, possibly split across segments
//! - **Float arrays**: 32-bit float vectors, either a plain in-memory
//!   sequence or a packed little-endian byte buffer decoded lazily
//!
//! Packed arrays backed by a contiguous buffer read elements in place without
//! copying. The full float sequence is decoded at most once per array and
//! then shared.
//!
//! # Quick Start
//!
//! ```rust
//! use extra_values::{BytesValue, ExtraFieldValue, ExtraFieldValues, PackedFloatArray};
//! use extra_values::codec::{decode_extra_field_values, encode_extra_field_values};
//!
//! let bag: ExtraFieldValues = [
//!     ("doc.thumbnail", ExtraFieldValue::from(BytesValue::from(vec![0x89, 0x50, 0x4E, 0x47]))),
//!     ("doc.embedding", PackedFloatArray::from_floats(&[0.25, -1.0, 3.5]).into()),
//! ]
//! .into_iter()
//! .collect();
//!
//! // Encode to binary
//! let bytes = encode_extra_field_values(&bag).unwrap();
//!
//! // Decode back
//! let decoded = decode_extra_field_values(&bytes).unwrap();
//! let embedding = decoded.get("doc.embedding").unwrap().as_float_array().unwrap();
//! assert!(embedding.is_packed());
//! assert_eq!(embedding.get(2).unwrap(), 3.5);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Byte sources, value variants, float arrays and the bag
//! - [`codec`]: Binary encoding/decoding with compression support
//! - [`mapping`]: Projection of a bag into stored fields
//! - [`error`]: Error types
//! - [`limits`]: Security limits for decoding
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - All allocations are bounded by the limits in [`limits`]
//! - Varints are limited to prevent overflow
//! - Packed buffers must match their declared dimension exactly
//! - Unknown type ids and duplicate keys are rejected
//!
//! # Wire Format
//!
//! Values are framed as a type id byte followed by a self-delimiting body.
//! Bags are a varint count of `(key, value)` pairs. Bags persisted outside a
//! request use a snapshot envelope:
//! - Uncompressed: `EFVS` magic + version + bag
//! - Compressed: `EFVSZ` magic + uncompressed size + zstd data

pub mod codec;
pub mod error;
pub mod limits;
pub mod mapping;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{
    decode_extra_field_values, decode_snapshot, decode_value, encode_extra_field_values,
    encode_snapshot, encode_snapshot_compressed, encode_value, EncodeOptions,
};
pub use error::{DecodeError, EncodeError, ErrorCode, MappingError, ValueError};
pub use mapping::{map_extra_fields, ExtraFieldMapper, StoredField, StoredValue, SummaryFieldMapper};
pub use model::{
    ByteArray, ByteSource, BytesValue, CompositeBytes, ExtraFieldValue, ExtraFieldValues,
    FloatArrayValue, PackedFloatArray, PrimitiveFloatArray, SharedBytes, ValueType,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
