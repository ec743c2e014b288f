//! Immutable bag of extra field values keyed by field path.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::model::value::ExtraFieldValue;

lazy_static! {
    static ref EMPTY: ExtraFieldValues = ExtraFieldValues {
        values: Arc::new(FxHashMap::default()),
    };
}

/// Field path → value mapping attached to one write operation.
///
/// The bag is immutable once built. Cloning is cheap and shares the entries.
///
/// The exposed map is read-only:
///
/// ```compile_fail
/// use extra_values::{BytesValue, ExtraFieldValues};
///
/// let bag = ExtraFieldValues::empty();
/// bag.values().insert("x".to_string(), BytesValue::from(vec![1u8]).into());
/// ```
#[derive(Debug, Clone)]
pub struct ExtraFieldValues {
    values: Arc<FxHashMap<String, ExtraFieldValue>>,
}

impl ExtraFieldValues {
    /// The shared empty bag.
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Builds a bag from a snapshot of `map`.
    ///
    /// Later changes to `map` are not observed by the bag. Payload storage of
    /// the values is shared, not copied.
    pub fn from_map<S: BuildHasher>(map: &HashMap<String, ExtraFieldValue, S>) -> Self {
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub(crate) fn from_entries(values: FxHashMap<String, ExtraFieldValue>) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        Self {
            values: Arc::new(values),
        }
    }

    /// Returns true if the bag has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Looks up the value for a field path.
    pub fn get(&self, path: &str) -> Option<&ExtraFieldValue> {
        self.values.get(path)
    }

    /// Read-only view of all entries.
    pub fn values(&self) -> &FxHashMap<String, ExtraFieldValue> {
        &self.values
    }

    /// Iterates entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraFieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries sorted by field path.
    pub fn sorted_entries(&self) -> Vec<(&str, &ExtraFieldValue)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Returns true if this bag shares storage with [`ExtraFieldValues::empty`].
    pub fn is_shared_empty(&self) -> bool {
        Arc::ptr_eq(&self.values, &EMPTY.values)
    }
}

impl Default for ExtraFieldValues {
    fn default() -> Self {
        Self::empty()
    }
}

/// Later entries replace earlier ones with the same path.
impl<K: Into<String>> FromIterator<(K, ExtraFieldValue)> for ExtraFieldValues {
    fn from_iter<I: IntoIterator<Item = (K, ExtraFieldValue)>>(iter: I) -> Self {
        let values: FxHashMap<String, ExtraFieldValue> =
            iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::from_entries(values)
    }
}

/// Bags are equal when they hold the same paths with equal values.
impl PartialEq for ExtraFieldValues {
    fn eq(&self, other: &Self) -> bool {
        *self.values == *other.values
    }
}
