//! Projection of a bag into stored fields.
//!
//! Consumers register an [`ExtraFieldMapper`] per field path. Each mapper is
//! handed the path and the value and appends the fields it wants to keep.
//! [`SummaryFieldMapper`] is a reference projection that records the value's
//! type label and a few shape facts.

use crate::error::MappingError;
use crate::model::{ExtraFieldValue, ExtraFieldValues};

/// A stored field payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Binary(Vec<u8>),
    Int(i64),
    Float(f32),
}

/// A named field produced by a mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredField {
    pub name: String,
    pub value: StoredValue,
}

impl StoredField {
    pub fn binary(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: StoredValue::Binary(bytes.into()),
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: StoredValue::Int(value),
        }
    }

    pub fn float(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value: StoredValue::Float(value),
        }
    }
}

/// Mapper for one field path of a bag.
pub trait ExtraFieldMapper: Send + Sync {
    /// Appends the stored fields for `value` at `path`.
    fn map(
        &self,
        path: &str,
        value: &ExtraFieldValue,
        out: &mut Vec<StoredField>,
    ) -> Result<(), MappingError>;
}

/// Stores the type label plus a summary of the value.
///
/// - `{path}_type`: type label (`BYTES` / `FLOAT_ARRAY`)
/// - bytes: `{path}` with the raw bytes and `{path}_len`
/// - float array: `{path}_dim`, and `{path}_f0` when non-empty
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryFieldMapper;

impl ExtraFieldMapper for SummaryFieldMapper {
    fn map(
        &self,
        path: &str,
        value: &ExtraFieldValue,
        out: &mut Vec<StoredField>,
    ) -> Result<(), MappingError> {
        out.push(StoredField::binary(
            format!("{path}_type"),
            value.value_type().label().as_bytes(),
        ));

        match value {
            ExtraFieldValue::Bytes(v) => {
                out.push(StoredField::binary(path, v.to_vec()));
                out.push(StoredField::int(format!("{path}_len"), v.size() as i64));
            }
            ExtraFieldValue::FloatArray(v) => {
                out.push(StoredField::int(format!("{path}_dim"), v.dimension() as i64));
                if v.dimension() > 0 {
                    out.push(StoredField::float(format!("{path}_f0"), v.get(0)?));
                }
            }
        }
        Ok(())
    }
}

/// Maps every entry of `values` with the mapper `lookup` returns for its path.
///
/// Entries are visited in path order. Fails on the first path without a
/// mapper.
pub fn map_extra_fields<'m, F>(
    values: &ExtraFieldValues,
    lookup: F,
) -> Result<Vec<StoredField>, MappingError>
where
    F: Fn(&str) -> Option<&'m dyn ExtraFieldMapper>,
{
    let mut out = Vec::with_capacity(values.len() * 3);
    for (path, value) in values.sorted_entries() {
        let mapper = lookup(path).ok_or_else(|| MappingError::NoMapper {
            path: path.to_string(),
        })?;
        mapper.map(path, value, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BytesValue, PackedFloatArray, PrimitiveFloatArray};

    static SUMMARY: SummaryFieldMapper = SummaryFieldMapper;

    fn summary_for(path: &str) -> Option<&'static dyn ExtraFieldMapper> {
        path.starts_with("extra.").then_some(&SUMMARY as &dyn ExtraFieldMapper)
    }

    fn find<'a>(fields: &'a [StoredField], name: &str) -> Option<&'a StoredValue> {
        fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    #[test]
    fn test_bytes_summary() {
        let bag: ExtraFieldValues = [("extra.blob", ExtraFieldValue::from(BytesValue::from(vec![1u8, 2, 3])))]
            .into_iter()
            .collect();
        let fields = map_extra_fields(&bag, summary_for).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(
            find(&fields, "extra.blob_type"),
            Some(&StoredValue::Binary(b"BYTES".to_vec()))
        );
        assert_eq!(find(&fields, "extra.blob"), Some(&StoredValue::Binary(vec![1, 2, 3])));
        assert_eq!(find(&fields, "extra.blob_len"), Some(&StoredValue::Int(3)));
    }

    #[test]
    fn test_float_array_summary() {
        let bag: ExtraFieldValues = [
            ("extra.packed", ExtraFieldValue::from(PackedFloatArray::from_floats(&[0.5, 1.5]))),
            ("extra.primitive", PrimitiveFloatArray::new(vec![7.0f32]).into()),
        ]
        .into_iter()
        .collect();
        let fields = map_extra_fields(&bag, summary_for).unwrap();

        assert_eq!(
            find(&fields, "extra.packed_type"),
            Some(&StoredValue::Binary(b"FLOAT_ARRAY".to_vec()))
        );
        assert_eq!(find(&fields, "extra.packed_dim"), Some(&StoredValue::Int(2)));
        assert_eq!(find(&fields, "extra.packed_f0"), Some(&StoredValue::Float(0.5)));
        assert_eq!(find(&fields, "extra.primitive_dim"), Some(&StoredValue::Int(1)));
        assert_eq!(find(&fields, "extra.primitive_f0"), Some(&StoredValue::Float(7.0)));
        // path order
        assert_eq!(fields[0].name, "extra.packed_type");
    }

    #[test]
    fn test_empty_float_array_has_no_first_element() {
        let bag: ExtraFieldValues = [("extra.v", ExtraFieldValue::from(PrimitiveFloatArray::new(Vec::<f32>::new())))]
            .into_iter()
            .collect();
        let fields = map_extra_fields(&bag, summary_for).unwrap();

        assert_eq!(find(&fields, "extra.v_dim"), Some(&StoredValue::Int(0)));
        assert!(find(&fields, "extra.v_f0").is_none());
    }

    #[test]
    fn test_missing_mapper() {
        let bag: ExtraFieldValues = [("other", ExtraFieldValue::from(BytesValue::from(vec![1u8])))]
            .into_iter()
            .collect();
        let err = map_extra_fields(&bag, summary_for).unwrap_err();

        assert_eq!(err, MappingError::NoMapper { path: "other".to_string() });
        assert_eq!(err.to_string(), "no mapper found for extra field [other]");
    }

    #[test]
    fn test_empty_bag_maps_to_nothing() {
        let fields = map_extra_fields(&ExtraFieldValues::empty(), |_| None).unwrap();
        assert!(fields.is_empty());
    }
}
