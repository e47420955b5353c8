//! Identifier-based matching

use sync_model::{ObjectHandle, ObjectStore};

use crate::error::Result;

use super::strategy::MatchStrategy;

/// Match by persistent identifier
///
/// Safe whenever both stores share lineage: the identifier is stable and
/// store-independent, so the first candidate carrying the same one is the
/// same logical object.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidMatch;

impl MatchStrategy for GuidMatch {
    fn name(&self) -> &str {
        "guid"
    }

    fn find_match(
        &self,
        source_object: &ObjectHandle,
        candidates: &[ObjectHandle],
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
    ) -> Result<Option<usize>> {
        let wanted = source.guid_of(source_object)?;
        for (index, candidate) in candidates.iter().enumerate() {
            if target.guid_of(candidate)? == wanted {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}
