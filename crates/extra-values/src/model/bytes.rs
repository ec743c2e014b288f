//! Byte sequence abstraction shared by the bytes and packed float variants.
//!
//! A [`ByteSource`] is an immutable, possibly segmented, run of bytes. Sources
//! that are a single window over a shared array advertise it through
//! [`ByteSource::backing_array`], which lets readers decode in place instead of
//! flattening first.

use std::fmt;
use std::sync::Arc;

use crate::error::ValueError;

/// Shared, type-erased byte source.
pub type SharedBytes = Arc<dyn ByteSource>;

/// An immutable sequence of bytes.
pub trait ByteSource: fmt::Debug + Send + Sync {
    /// Total number of bytes.
    fn len(&self) -> usize;

    /// Returns true if the source holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the shared backing array and the offset this source starts at,
    /// if the source is one contiguous window over it.
    ///
    /// Sources returning `None` are flattened with [`ByteSource::to_vec`] when a
    /// contiguous view is needed.
    fn backing_array(&self) -> Option<(&Arc<[u8]>, usize)> {
        None
    }

    /// Physical segments in read order. Empty segments may be omitted.
    fn segments(&self) -> Vec<&[u8]>;

    /// Copies all bytes into one freshly allocated buffer.
    fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for segment in self.segments() {
            out.extend_from_slice(segment);
        }
        out
    }
}

/// Compares two byte sources by content, regardless of segmentation.
pub fn content_eq(a: &dyn ByteSource, b: &dyn ByteSource) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut rest_b = b.segments().into_iter().filter(|s| !s.is_empty());
    let mut current: &[u8] = &[];
    for mut seg in a.segments() {
        while !seg.is_empty() {
            if current.is_empty() {
                match rest_b.next() {
                    Some(next) => current = next,
                    None => return false,
                }
            }
            let n = seg.len().min(current.len());
            if seg[..n] != current[..n] {
                return false;
            }
            seg = &seg[n..];
            current = &current[n..];
        }
    }
    true
}

// =============================================================================
// ARRAY WINDOW
// =============================================================================

/// A window `[offset, offset + len)` over a shared byte array.
#[derive(Clone)]
pub struct ByteArray {
    array: Arc<[u8]>,
    offset: usize,
    len: usize,
}

impl ByteArray {
    /// Wraps the whole array.
    pub fn new(array: Arc<[u8]>) -> Self {
        let len = array.len();
        Self { array, offset: 0, len }
    }

    /// Wraps `array[offset..offset + len]`.
    pub fn window(array: Arc<[u8]>, offset: usize, len: usize) -> Result<Self, ValueError> {
        let in_bounds = offset
            .checked_add(len)
            .is_some_and(|end| end <= array.len());
        if !in_bounds {
            return Err(ValueError::WindowOutOfBounds {
                offset,
                len,
                array_len: array.len(),
            });
        }
        Ok(Self { array, offset, len })
    }

    /// The shared backing array.
    pub fn array(&self) -> &Arc<[u8]> {
        &self.array
    }

    /// Start of this window within [`ByteArray::array`].
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The bytes of this window.
    pub fn as_slice(&self) -> &[u8] {
        &self.array[self.offset..self.offset + self.len]
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(Arc::from(bytes))
    }
}

impl From<&[u8]> for ByteArray {
    fn from(bytes: &[u8]) -> Self {
        Self::new(Arc::from(bytes))
    }
}

impl fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteArray")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

impl ByteSource for ByteArray {
    fn len(&self) -> usize {
        self.len
    }

    fn backing_array(&self) -> Option<(&Arc<[u8]>, usize)> {
        Some((&self.array, self.offset))
    }

    fn segments(&self) -> Vec<&[u8]> {
        vec![self.as_slice()]
    }
}

// =============================================================================
// COMPOSITE
// =============================================================================

/// Logical concatenation of several byte sources, read in order.
///
/// Never exposes a backing array, even when it has a single part.
#[derive(Debug, Clone, Default)]
pub struct CompositeBytes {
    parts: Vec<SharedBytes>,
    len: usize,
}

impl CompositeBytes {
    /// Concatenates `parts` without copying them.
    pub fn of(parts: impl IntoIterator<Item = SharedBytes>) -> Self {
        let parts: Vec<SharedBytes> = parts.into_iter().collect();
        let len = parts.iter().map(|p| p.len()).sum();
        Self { parts, len }
    }

    /// The concatenated parts.
    pub fn parts(&self) -> &[SharedBytes] {
        &self.parts
    }
}

impl ByteSource for CompositeBytes {
    fn len(&self) -> usize {
        self.len
    }

    fn segments(&self) -> Vec<&[u8]> {
        self.parts
            .iter()
            .flat_map(|p| p.segments())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Owned buffer with no shareable backing array.
impl ByteSource for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn segments(&self) -> Vec<&[u8]> {
        vec![self.as_slice()]
    }

    fn to_vec(&self) -> Vec<u8> {
        self.clone()
    }
}
