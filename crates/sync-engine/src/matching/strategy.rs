//! The match strategy capability

use sync_model::{ObjectHandle, ObjectStore};

use crate::error::Result;

/// Rule for pairing one source object with a target candidate
///
/// `candidates` holds the target objects not yet consumed by an earlier
/// pairing; a strategy returns the index of the first candidate it accepts,
/// or `None` when the source object has no counterpart.
pub trait MatchStrategy {
    /// Registry key for this strategy
    fn name(&self) -> &str;

    fn find_match(
        &self,
        source_object: &ObjectHandle,
        candidates: &[ObjectHandle],
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
    ) -> Result<Option<usize>>;
}
