//! Float array values: primitive float sequences and packed little-endian bytes.
//!
//! Both representations share one contract through [`FloatArrayValue`]. The
//! packed form keeps its bytes as the canonical storage so it can be forwarded
//! without decoding, and decodes lazily:
//!
//! - If its byte source exposes a backing array, reads go straight to that
//!   array at the source's offset (no copy).
//! - Otherwise the source is flattened once into a compact buffer on first
//!   read, and that buffer is reused for every later read.
//! - The full float sequence is decoded on first request and cached.
//!
//! Memoized state lives in [`OnceLock`] cells. Each cell is filled with a fully
//! built value, so a reader never sees partial data. Concurrent first readers
//! may each decode; the first value published wins and the rest are dropped.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::error::ValueError;
use crate::model::bytes::{content_eq, ByteArray, ByteSource, SharedBytes};

/// Size of one packed float in bytes.
pub const FLOAT_BYTES: usize = 4;

// =============================================================================
// SHARED CONTRACT
// =============================================================================

/// A float array in one of its two representations.
#[derive(Debug, Clone)]
pub enum FloatArrayValue {
    /// Directly addressable floats.
    Primitive(PrimitiveFloatArray),
    /// Little-endian packed floats.
    Packed(PackedFloatArray),
}

impl FloatArrayValue {
    /// Number of float elements.
    pub fn dimension(&self) -> usize {
        match self {
            FloatArrayValue::Primitive(v) => v.dimension(),
            FloatArrayValue::Packed(v) => v.dimension(),
        }
    }

    /// True if backed by little-endian packed bytes.
    pub fn is_packed(&self) -> bool {
        matches!(self, FloatArrayValue::Packed(_))
    }

    /// Packed bytes (`dimension * 4`, little-endian).
    ///
    /// Fails with [`ValueError::InvalidState`] for a primitive array.
    pub fn packed_bytes(&self) -> Result<&SharedBytes, ValueError> {
        match self {
            FloatArrayValue::Primitive(_) => Err(ValueError::InvalidState { reason: "not packed" }),
            FloatArrayValue::Packed(v) => Ok(v.packed_bytes()),
        }
    }

    /// Returns element `i`.
    pub fn get(&self, i: usize) -> Result<f32, ValueError> {
        match self {
            FloatArrayValue::Primitive(v) => v.get(i),
            FloatArrayValue::Packed(v) => v.get(i),
        }
    }

    /// Returns all elements. May allocate once for a packed array.
    pub fn as_float_sequence(&self) -> &[f32] {
        match self {
            FloatArrayValue::Primitive(v) => v.as_float_sequence(),
            FloatArrayValue::Packed(v) => v.as_float_sequence(),
        }
    }
}

impl From<PrimitiveFloatArray> for FloatArrayValue {
    fn from(v: PrimitiveFloatArray) -> Self {
        FloatArrayValue::Primitive(v)
    }
}

impl From<PackedFloatArray> for FloatArrayValue {
    fn from(v: PackedFloatArray) -> Self {
        FloatArrayValue::Packed(v)
    }
}

/// Two arrays are equal when they use the same representation and hold the
/// same float bit patterns (so NaN payloads compare equal to themselves).
impl PartialEq for FloatArrayValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FloatArrayValue::Primitive(a), FloatArrayValue::Primitive(b)) => {
                floats_bit_eq(a.as_float_sequence(), b.as_float_sequence())
            }
            (FloatArrayValue::Packed(a), FloatArrayValue::Packed(b)) => {
                a.dimension == b.dimension && content_eq(&*a.packed, &*b.packed)
            }
            _ => false,
        }
    }
}

fn floats_bit_eq(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

// =============================================================================
// PRIMITIVE
// =============================================================================

/// Floats held directly, for callers that already have a float slice.
#[derive(Debug, Clone)]
pub struct PrimitiveFloatArray {
    values: Arc<[f32]>,
}

impl PrimitiveFloatArray {
    /// Wraps `values` without copying when given an `Arc<[f32]>`.
    pub fn new(values: impl Into<Arc<[f32]>>) -> Self {
        Self { values: values.into() }
    }

    /// Number of elements.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Returns element `i`, or [`ValueError::IndexOutOfRange`].
    pub fn get(&self, i: usize) -> Result<f32, ValueError> {
        self.values.get(i).copied().ok_or(ValueError::IndexOutOfRange {
            index: i,
            dimension: self.values.len(),
        })
    }

    /// The owned sequence itself.
    pub fn as_float_sequence(&self) -> &[f32] {
        &self.values
    }

    /// The shared sequence handle.
    pub fn values(&self) -> &Arc<[f32]> {
        &self.values
    }
}

// =============================================================================
// PACKED
// =============================================================================

/// Contiguous bytes a packed array decodes from: an array plus the offset of
/// element 0 within it.
#[derive(Debug, Clone)]
pub struct ContiguousBytes {
    array: Arc<[u8]>,
    offset: usize,
}

impl ContiguousBytes {
    /// The array decoded from.
    pub fn array(&self) -> &Arc<[u8]> {
        &self.array
    }

    /// Offset of element 0 in [`ContiguousBytes::array`].
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn decode_at(&self, i: usize) -> f32 {
        let p = self.offset + i * FLOAT_BYTES;
        let a = &self.array;
        f32::from_le_bytes([a[p], a[p + 1], a[p + 2], a[p + 3]])
    }
}

/// Packed little-endian floats. Canonical storage is a [`ByteSource`].
#[derive(Clone)]
pub struct PackedFloatArray {
    packed: SharedBytes,
    dimension: usize,
    contiguous: OnceLock<ContiguousBytes>,
    decoded: OnceLock<Vec<f32>>,
}

impl PackedFloatArray {
    /// Wraps an arbitrary byte source holding `dimension * 4` bytes.
    pub fn from_packed_bytes(packed: SharedBytes, dimension: usize) -> Result<Self, ValueError> {
        validate(packed.len(), dimension)?;
        Ok(Self {
            packed,
            dimension,
            contiguous: OnceLock::new(),
            decoded: OnceLock::new(),
        })
    }

    /// Wraps a whole array holding `dimension * 4` bytes.
    pub fn from_packed_array(array: Arc<[u8]>, dimension: usize) -> Result<Self, ValueError> {
        let len = array.len();
        Self::from_packed_array_window(array, 0, len, dimension)
    }

    /// Wraps `array[offset..offset + length]`, which must hold `dimension * 4` bytes.
    ///
    /// The window exposes `array` as its backing array, so reads never copy it.
    pub fn from_packed_array_window(
        array: Arc<[u8]>,
        offset: usize,
        length: usize,
        dimension: usize,
    ) -> Result<Self, ValueError> {
        let window = ByteArray::window(array, offset, length)?;
        Self::from_packed_bytes(Arc::new(window), dimension)
    }

    /// Packs `values` little-endian into a new array.
    pub fn from_floats(values: &[f32]) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * FLOAT_BYTES);
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let array: Arc<[u8]> = Arc::from(bytes);
        Self {
            packed: Arc::new(ByteArray::new(Arc::clone(&array))),
            dimension: values.len(),
            contiguous: OnceLock::from(ContiguousBytes { array, offset: 0 }),
            decoded: OnceLock::new(),
        }
    }

    /// Number of elements.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The packed bytes, exactly as supplied.
    pub fn packed_bytes(&self) -> &SharedBytes {
        &self.packed
    }

    /// Returns element `i`, decoding only its 4 bytes.
    pub fn get(&self, i: usize) -> Result<f32, ValueError> {
        if i >= self.dimension {
            return Err(ValueError::IndexOutOfRange {
                index: i,
                dimension: self.dimension,
            });
        }
        if let Some(decoded) = self.decoded.get() {
            return Ok(decoded[i]);
        }
        Ok(self.contiguous_bytes().decode_at(i))
    }

    /// Returns all elements, decoding them on first call.
    ///
    /// Later calls return the same cached slice.
    pub fn as_float_sequence(&self) -> &[f32] {
        if let Some(decoded) = self.decoded.get() {
            return decoded;
        }
        let view = self.contiguous_bytes();
        trace!(dimension = self.dimension, "decoding packed float array");
        let start = view.offset;
        let end = start + self.dimension * FLOAT_BYTES;
        let values: Vec<f32> = view.array[start..end]
            .chunks_exact(FLOAT_BYTES)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        self.decoded.get_or_init(|| values)
    }

    /// Contiguous view used for decoding, materialized on first use.
    ///
    /// Sources with a backing array are used in place. Any other source is
    /// flattened into one new array, once.
    pub fn contiguous_bytes(&self) -> &ContiguousBytes {
        if let Some(view) = self.contiguous.get() {
            return view;
        }
        let view = match self.packed.backing_array() {
            Some((array, offset)) => ContiguousBytes {
                array: Arc::clone(array),
                offset,
            },
            None => {
                trace!(len = self.packed.len(), "flattening packed byte source");
                ContiguousBytes {
                    array: Arc::from(self.packed.to_vec()),
                    offset: 0,
                }
            }
        };
        self.contiguous.get_or_init(|| view)
    }
}

impl fmt::Debug for PackedFloatArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedFloatArray")
            .field("dimension", &self.dimension)
            .field("packed", &self.packed)
            .field("materialized", &self.contiguous.get().is_some())
            .field("decoded", &self.decoded.get().is_some())
            .finish()
    }
}

fn validate(byte_len: usize, dimension: usize) -> Result<(), ValueError> {
    let expected = dimension.checked_mul(FLOAT_BYTES);
    if expected != Some(byte_len) {
        return Err(ValueError::MalformedPackedArray {
            dimension,
            expected,
            actual: byte_len,
        });
    }
    Ok(())
}
