//! Binary encoding/decoding for extra field values.
//!
//! - [`primitives`]: varints, length-prefixed strings and byte runs, floats.
//! - [`value`]: `[type id][body]` framing of a single value.
//! - [`values`]: bag of values keyed by field path.
//! - [`snapshot`]: magic-prefixed envelope, optionally zstd-compressed.

pub mod primitives;
pub mod snapshot;
pub mod value;
pub mod values;

pub use primitives::{Reader, Writer};
pub use snapshot::{decode_snapshot, decompress, encode_snapshot, encode_snapshot_compressed};
pub use value::{decode_value, decode_value_from_slice, encode_value, encode_value_to_vec};
pub use values::{
    decode_extra_field_values, decode_values, encode_extra_field_values,
    encode_extra_field_values_with_options, encode_values, EncodeOptions,
};
