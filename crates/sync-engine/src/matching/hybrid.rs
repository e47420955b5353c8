//! Identifier-first matching with field fallback

use sync_model::{ObjectHandle, ObjectStore};

use crate::error::Result;

use super::field::FieldMatch;
use super::guid::GuidMatch;
use super::strategy::MatchStrategy;

/// Try identifier match first, fall back to field equality on a miss
///
/// Used when stores only partially share lineage: objects that were copied
/// between them keep their identifier, while independently entered
/// duplicates can still be paired by content.
pub struct HybridMatch {
    fallback: FieldMatch,
}

impl HybridMatch {
    pub fn new(fallback: FieldMatch) -> Self {
        Self { fallback }
    }
}

impl MatchStrategy for HybridMatch {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn find_match(
        &self,
        source_object: &ObjectHandle,
        candidates: &[ObjectHandle],
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
    ) -> Result<Option<usize>> {
        if let Some(index) = GuidMatch.find_match(source_object, candidates, source, target)? {
            return Ok(Some(index));
        }
        self.fallback
            .find_match(source_object, candidates, source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sync_model::{PersistentId, TypeTag};
    use sync_test_utils::MemoryStore;

    #[test]
    fn test_identifier_wins_over_fields() {
        let shared = PersistentId::random();
        let mut source = MemoryStore::new("source").with_type("entry", &["headword"]);
        let mut target = MemoryStore::new("target").with_type("entry", &["headword"]);

        let src = source.seed_object("entry", shared);
        source.seed_field(&src, "headword", json!("run"));

        // Candidate 0 matches by field, candidate 1 by identifier.
        let by_field = target.seed_object("entry", PersistentId::random());
        target.seed_field(&by_field, "headword", json!("run"));
        target.seed_object("entry", shared);

        let candidates = target.all_objects(&TypeTag::from("entry"), None).unwrap();
        let strategy = HybridMatch::new(FieldMatch::new(["headword"]));
        assert_eq!(
            strategy
                .find_match(&src, &candidates, &source, &target)
                .unwrap(),
            Some(1)
        );
    }

    #[test]
    fn test_field_fallback_on_identifier_miss() {
        let mut source = MemoryStore::new("source").with_type("entry", &["headword"]);
        let mut target = MemoryStore::new("target").with_type("entry", &["headword"]);

        let src = source.seed_object("entry", PersistentId::random());
        source.seed_field(&src, "headword", json!("walk"));

        let duplicate = target.seed_object("entry", PersistentId::random());
        target.seed_field(&duplicate, "headword", json!("walk"));

        let candidates = target.all_objects(&TypeTag::from("entry"), None).unwrap();
        let strategy = HybridMatch::new(FieldMatch::new(["headword"]));
        assert_eq!(
            strategy
                .find_match(&src, &candidates, &source, &target)
                .unwrap(),
            Some(0)
        );
    }
}
