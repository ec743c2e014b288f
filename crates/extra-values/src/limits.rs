//! Decoding limits and snapshot envelope constants.
//!
//! The decoder treats its input as untrusted. Every length read from the wire
//! is checked against one of these bounds before anything is allocated.

/// Maximum number of bytes in a varint (enough for a full u64).
pub const MAX_VARINT_BYTES: usize = 10;

/// Maximum length of a single byte payload (bytes values and packed floats).
pub const MAX_BYTES_LEN: usize = 256 * 1024 * 1024;

/// Maximum float array dimension.
pub const MAX_DIMENSION: usize = MAX_BYTES_LEN / 4;

/// Maximum length of a field path key, in bytes.
pub const MAX_FIELD_PATH_LEN: usize = 64 * 1024;

/// Maximum number of entries in one bag.
pub const MAX_BAG_ENTRIES: usize = 1 << 20;

/// Maximum size of an uncompressed snapshot.
pub const MAX_SNAPSHOT_SIZE: usize = 1024 * 1024 * 1024;

/// Magic bytes of an uncompressed snapshot.
pub const MAGIC_UNCOMPRESSED: &[u8; 4] = b"EFVS";

/// Magic bytes of a zstd-compressed snapshot.
pub const MAGIC_COMPRESSED: &[u8; 5] = b"EFVSZ";

/// Snapshot format version written by the encoder.
pub const FORMAT_VERSION: u8 = 1;

/// Oldest snapshot format version the decoder accepts.
pub const MIN_FORMAT_VERSION: u8 = 1;
