//! Snapshot envelope for persisting a bag outside a request.
//!
//! Uncompressed: `EFVS` magic, version byte, bag body.
//! Compressed: `EFVSZ` magic, varint uncompressed size, zstd frame of the
//! uncompressed envelope.

use std::io::Read;

use tracing::debug;

use crate::codec::primitives::{Reader, Writer};
use crate::codec::values::{decode_values, encode_values, EncodeOptions};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    FORMAT_VERSION, MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED, MAX_SNAPSHOT_SIZE, MIN_FORMAT_VERSION,
};
use crate::model::ExtraFieldValues;

// =============================================================================
// DECODING
// =============================================================================

/// Decompresses an `EFVSZ` snapshot, returning the uncompressed envelope.
///
/// The result starts with `EFVS` and can be passed to [`decode_snapshot`].
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if input.len() < 5 {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }
    if &input[0..5] != MAGIC_COMPRESSED {
        return Err(DecodeError::InvalidMagic { found: magic_of(input) });
    }
    decompress_zstd(&input[5..])
}

/// Decodes a snapshot in either envelope.
pub fn decode_snapshot(input: &[u8]) -> Result<ExtraFieldValues, DecodeError> {
    if input.len() < 4 {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }

    if input.len() >= 5 && &input[0..5] == MAGIC_COMPRESSED {
        let decompressed = decompress_zstd(&input[5..])?;
        debug!(
            compressed = input.len(),
            uncompressed = decompressed.len(),
            "decompressed snapshot"
        );
        if decompressed.len() < 4 || &decompressed[0..4] != MAGIC_UNCOMPRESSED {
            return Err(DecodeError::InvalidMagic { found: magic_of(&decompressed) });
        }
        decode_uncompressed(&decompressed)
    } else if &input[0..4] == MAGIC_UNCOMPRESSED {
        if input.len() > MAX_SNAPSHOT_SIZE {
            return Err(DecodeError::LengthExceedsLimit {
                field: "snapshot",
                len: input.len(),
                max: MAX_SNAPSHOT_SIZE,
            });
        }
        decode_uncompressed(input)
    } else {
        Err(DecodeError::InvalidMagic { found: magic_of(input) })
    }
}

fn decode_uncompressed(input: &[u8]) -> Result<ExtraFieldValues, DecodeError> {
    let mut reader = Reader::new(input);
    reader.read_bytes(4, "magic")?;

    let version = reader.read_byte("version")?;
    if !(MIN_FORMAT_VERSION..=FORMAT_VERSION).contains(&version) {
        return Err(DecodeError::UnsupportedVersion { version });
    }

    let values = decode_values(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            context: "snapshot",
            count: reader.remaining_len(),
        });
    }
    Ok(values)
}

fn decompress_zstd(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut reader = Reader::new(compressed);
    let declared_size = reader.read_len(MAX_SNAPSHOT_SIZE, "uncompressed_size")?;

    let mut decoder = zstd::Decoder::new(reader.remaining())
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    // The declared size is untrusted: preallocate at most 16x the frame, and
    // read one byte past the declared size so an oversized frame is caught
    // without inflating it entirely.
    let capacity = declared_size.min(compressed.len().saturating_mul(16));
    let mut decompressed = Vec::with_capacity(capacity);
    (&mut decoder)
        .take(declared_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() != declared_size {
        return Err(DecodeError::UncompressedSizeMismatch {
            declared: declared_size,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}

fn magic_of(input: &[u8]) -> [u8; 4] {
    let mut found = [0u8; 4];
    let n = input.len().min(4);
    found[..n].copy_from_slice(&input[..n]);
    found
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a bag into an uncompressed `EFVS` snapshot.
pub fn encode_snapshot(values: &ExtraFieldValues, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::with_capacity(64);
    writer.write_bytes(MAGIC_UNCOMPRESSED);
    writer.write_byte(FORMAT_VERSION);
    encode_values(&mut writer, values, options)?;

    let bytes = writer.into_bytes();
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(EncodeError::LengthExceedsLimit {
            field: "snapshot",
            len: bytes.len(),
            max: MAX_SNAPSHOT_SIZE,
        });
    }
    Ok(bytes)
}

/// Encodes a bag into a zstd-compressed `EFVSZ` snapshot.
pub fn encode_snapshot_compressed(
    values: &ExtraFieldValues,
    level: i32,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let uncompressed = encode_snapshot(values, options)?;

    let compressed = zstd::encode_all(uncompressed.as_slice(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;

    let mut writer = Writer::with_capacity(5 + 10 + compressed.len());
    writer.write_bytes(MAGIC_COMPRESSED);
    writer.write_varint(uncompressed.len() as u64);
    writer.write_bytes(&compressed);

    Ok(writer.into_bytes())
}
