//! Field-equality matching

use sync_model::{FieldValue, ObjectHandle, ObjectStore};

use crate::error::Result;

use super::strategy::MatchStrategy;

/// Pluggable value extractor
///
/// The default extractor calls [`ObjectStore::read_field`]; callers with
/// richer accessors can substitute their own.
pub type FieldExtractor =
    Box<dyn Fn(&dyn ObjectStore, &ObjectHandle, &str) -> Option<FieldValue>>;

/// Match by equality of a configured, ordered set of fields
///
/// All configured fields must be present on both sides and equal for a
/// match; the first fully matching candidate wins. Useful when stores do
/// not share lineage and identifiers carry no meaning across them.
pub struct FieldMatch {
    fields: Vec<String>,
    case_sensitive: bool,
    extractor: Option<FieldExtractor>,
}

impl FieldMatch {
    /// Create a case-sensitive matcher over the given fields
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            case_sensitive: true,
            extractor: None,
        }
    }

    /// Compare string values ignoring case
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Substitute a custom value extractor
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    fn extract(
        &self,
        store: &dyn ObjectStore,
        object: &ObjectHandle,
        field: &str,
    ) -> Option<FieldValue> {
        match &self.extractor {
            Some(extractor) => extractor(store, object, field),
            None => store.read_field(object, field).ok().flatten(),
        }
    }

    fn values_equal(&self, a: &FieldValue, b: &FieldValue) -> bool {
        if !self.case_sensitive {
            if let (Some(a), Some(b)) = (a.as_str(), b.as_str()) {
                return a.eq_ignore_ascii_case(b);
            }
        }
        a == b
    }
}

impl MatchStrategy for FieldMatch {
    fn name(&self) -> &str {
        "field"
    }

    fn find_match(
        &self,
        source_object: &ObjectHandle,
        candidates: &[ObjectHandle],
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
    ) -> Result<Option<usize>> {
        // Extract once per source object; a missing field means this object
        // can never field-match.
        let mut wanted = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match self.extract(source, source_object, field) {
                Some(value) => wanted.push(value),
                None => return Ok(None),
            }
        }

        'candidates: for (index, candidate) in candidates.iter().enumerate() {
            for (field, expected) in self.fields.iter().zip(&wanted) {
                match self.extract(target, candidate, field) {
                    Some(actual) if self.values_equal(expected, &actual) => {}
                    _ => continue 'candidates,
                }
            }
            return Ok(Some(index));
        }
        Ok(None)
    }
}
