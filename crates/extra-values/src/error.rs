//! Error types for extra field value construction, access, encoding and decoding.

use thiserror::Error;

/// Short codes grouping decode errors by cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Invalid snapshot magic/version
    InvalidMagicOrVersion,
    /// E002: Unregistered value type id
    UnknownVariant,
    /// E004: Invalid UTF-8 encoding
    InvalidUtf8,
    /// E005: Malformed varint/length/bool/framing
    MalformedEncoding,
    /// E006: Decoded body does not form a valid value
    InvalidValue,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidMagicOrVersion => "E001",
            ErrorCode::UnknownVariant => "E002",
            ErrorCode::InvalidUtf8 => "E004",
            ErrorCode::MalformedEncoding => "E005",
            ErrorCode::InvalidValue => "E006",
        }
    }
}

/// Error raised while constructing or reading a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Packed byte length does not match `dimension * 4`.
    ///
    /// `expected` is `None` when `dimension * 4` overflows.
    #[error(
        "bad packed float length={actual} expected={} (dim={dimension})",
        fmt_expected(.expected)
    )]
    MalformedPackedArray {
        dimension: usize,
        expected: Option<usize>,
        actual: usize,
    },

    #[error("index {index} out of range for dimension {dimension}")]
    IndexOutOfRange { index: usize, dimension: usize },

    #[error("invalid state: {reason}")]
    InvalidState { reason: &'static str },

    #[error("window offset={offset} len={len} exceeds array length {array_len}")]
    WindowOutOfBounds {
        offset: usize,
        len: usize,
        array_len: usize,
    },
}

fn fmt_expected(expected: &Option<usize>) -> String {
    match expected {
        Some(len) => len.to_string(),
        None => "<overflow>".to_string(),
    }
}

/// Error during binary decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001: Invalid magic/version ===
    #[error("[E001] invalid magic bytes: expected EFVS or EFVSZ, found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("[E001] unsupported version: {version}")]
    UnsupportedVersion { version: u8 },

    // === E002: Unknown variant ===
    #[error("[E002] unknown extra field value type id: {id}")]
    UnknownVariant { id: u8 },

    // === E004: Invalid UTF-8 ===
    #[error("[E004] invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    // === E005: Malformed encoding ===
    #[error("[E005] unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("[E005] varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("[E005] varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("[E005] {field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("[E005] invalid bool value: {value} (expected 0x00 or 0x01)")]
    InvalidBool { value: u8 },

    #[error("[E005] duplicate field path: {key:?}")]
    DuplicateKey { key: String },

    #[error("[E005] {count} trailing bytes after {context}")]
    TrailingBytes { context: &'static str, count: usize },

    // === Compression errors ===
    #[error("[E005] zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("[E005] decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },

    // === E006: Invalid value ===
    #[error("[E006] {0}")]
    InvalidValue(#[from] ValueError),
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::InvalidMagic { .. } | DecodeError::UnsupportedVersion { .. } => {
                ErrorCode::InvalidMagicOrVersion
            }
            DecodeError::UnknownVariant { .. } => ErrorCode::UnknownVariant,
            DecodeError::InvalidUtf8 { .. } => ErrorCode::InvalidUtf8,
            DecodeError::InvalidValue(_) => ErrorCode::InvalidValue,
            _ => ErrorCode::MalformedEncoding,
        }
    }
}

/// Error during binary encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),
}

/// Error while projecting a bag into stored fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("no mapper found for extra field [{path}]")]
    NoMapper { path: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}
