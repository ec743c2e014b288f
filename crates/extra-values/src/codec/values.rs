//! Bag encoding/decoding.
//!
//! A bag is written as a varint entry count followed by `(key, value)` pairs.
//! Keys are varint byte length plus UTF-8; values use the framing in
//! [`crate::codec::value`].

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::codec::primitives::{Reader, Writer};
use crate::codec::value::{decode_value, encode_value};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_BAG_ENTRIES, MAX_FIELD_PATH_LEN};
use crate::model::{ExtraFieldValue, ExtraFieldValues};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a bag body.
///
/// A zero-count bag decodes to the shared empty bag. Duplicate keys are
/// rejected.
pub fn decode_values(reader: &mut Reader<'_>) -> Result<ExtraFieldValues, DecodeError> {
    let count = reader.read_len(MAX_BAG_ENTRIES, "values.count")?;
    if count == 0 {
        return Ok(ExtraFieldValues::empty());
    }

    // Each entry takes at least 3 bytes; cap the preallocation by what is left.
    let capacity = count.min(reader.remaining_len() / 3);
    let mut entries = FxHashMap::with_capacity_and_hasher(capacity, Default::default());
    for _ in 0..count {
        let key = reader.read_str(MAX_FIELD_PATH_LEN, "values.key")?;
        let value = decode_value(reader)?;
        if entries.insert(key.to_string(), value).is_some() {
            return Err(DecodeError::DuplicateKey { key: key.to_string() });
        }
    }

    debug!(entries = count, "decoded extra field values");
    Ok(ExtraFieldValues::from_entries(entries))
}

/// Decodes a bag from a whole buffer, rejecting trailing bytes.
pub fn decode_extra_field_values(input: &[u8]) -> Result<ExtraFieldValues, DecodeError> {
    let mut reader = Reader::new(input);
    let values = decode_values(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            context: "values",
            count: reader.remaining_len(),
        });
    }
    Ok(values)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Options for encoding bags.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Write entries sorted by key.
    ///
    /// Default order follows map iteration and may differ between two equal
    /// bags. Canonical mode gives byte-identical output for equal bags, at
    /// the cost of a sort.
    pub canonical: bool,
}

impl EncodeOptions {
    /// Creates default (non-canonical) encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates canonical encoding options.
    pub fn canonical() -> Self {
        Self { canonical: true }
    }
}

/// Encodes a bag body.
pub fn encode_values(
    writer: &mut Writer,
    values: &ExtraFieldValues,
    options: EncodeOptions,
) -> Result<(), EncodeError> {
    if values.len() > MAX_BAG_ENTRIES {
        return Err(EncodeError::LengthExceedsLimit {
            field: "values.count",
            len: values.len(),
            max: MAX_BAG_ENTRIES,
        });
    }

    writer.write_varint(values.len() as u64);
    if options.canonical {
        for (key, value) in values.sorted_entries() {
            encode_entry(writer, key, value)?;
        }
    } else {
        for (key, value) in values.iter() {
            encode_entry(writer, key, value)?;
        }
    }
    Ok(())
}

/// Encodes a bag into a new buffer with default options.
pub fn encode_extra_field_values(values: &ExtraFieldValues) -> Result<Vec<u8>, EncodeError> {
    encode_extra_field_values_with_options(values, EncodeOptions::default())
}

/// Encodes a bag into a new buffer.
pub fn encode_extra_field_values_with_options(
    values: &ExtraFieldValues,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(estimate_size(values));
    encode_values(&mut writer, values, options)?;
    Ok(writer.into_bytes())
}

fn encode_entry(
    writer: &mut Writer,
    key: &str,
    value: &ExtraFieldValue,
) -> Result<(), EncodeError> {
    if key.len() > MAX_FIELD_PATH_LEN {
        return Err(EncodeError::LengthExceedsLimit {
            field: "values.key",
            len: key.len(),
            max: MAX_FIELD_PATH_LEN,
        });
    }
    writer.write_string(key);
    encode_value(writer, value)
}

fn estimate_size(values: &ExtraFieldValues) -> usize {
    values
        .iter()
        .map(|(k, v)| k.len() + 16 + v.size() * 4)
        .sum::<usize>()
        + 8
}
