//! Pairing and classification

use std::collections::BTreeSet;

use sync_model::{FieldDelta, FieldName, ObjectHandle, ObjectStore, TypeTag};

use crate::error::Result;
use crate::matching::MatchStrategy;
use crate::progress::{self, Phase, ProgressFn};

use super::change::{Change, ChangeKind, DiffResult};

/// Predicate restricting which source objects participate in a compare
pub type ObjectFilter<'a> = &'a dyn Fn(&dyn ObjectStore, &ObjectHandle) -> bool;

/// Pairs every source object with a target candidate and classifies the
/// outcome
///
/// The engine holds no state; all context arrives per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    /// Compare all objects of `ty` between `source` and `target`
    ///
    /// Each source object is matched against the not-yet-consumed target
    /// objects via `strategy`: a miss is `New`, a hit is `Modified` or
    /// `Unchanged` depending on field-level differences. Target objects no
    /// source object consumed are `Deleted`. Emission order is source
    /// enumeration order, then leftover-target order, so results are
    /// reproducible.
    pub fn compare(
        &self,
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
        ty: &TypeTag,
        strategy: &dyn MatchStrategy,
        filter: Option<ObjectFilter<'_>>,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<DiffResult> {
        let source_objects: Vec<ObjectHandle> = source
            .all_objects(ty, None)?
            .into_iter()
            .filter(|o| filter.is_none_or(|f| f(source, o)))
            .collect();
        let mut candidates = target.all_objects(ty, None)?;

        let total = source_objects.len();
        let mut changes: Vec<Change> = Vec::with_capacity(total + candidates.len());

        for (index, source_object) in source_objects.iter().enumerate() {
            let source_id = source.guid_of(source_object)?;

            match strategy.find_match(source_object, &candidates, source, target)? {
                None => changes.push(Change::new_object(source_id, ty.clone())),
                Some(found) => {
                    let target_object = candidates.remove(found);
                    let target_id = target.guid_of(&target_object)?;
                    let deltas =
                        field_differences(source, source_object, target, &target_object, ty);
                    let kind = if deltas.is_empty() {
                        ChangeKind::Unchanged
                    } else {
                        ChangeKind::Modified
                    };
                    changes.push(Change::matched(kind, source_id, target_id, ty.clone(), deltas));
                }
            }

            progress::emit(&mut progress, Phase::Compare, index + 1, total);
        }

        for leftover in candidates {
            let target_id = target.guid_of(&leftover)?;
            changes.push(Change::deleted_object(target_id, ty.clone()));
        }

        let result = DiffResult::from_changes(changes);
        tracing::debug!(
            ty = %ty,
            new = result.num_new(),
            modified = result.num_modified(),
            deleted = result.num_deleted(),
            unchanged = result.num_unchanged(),
            "compare finished"
        );
        Ok(result)
    }
}

/// Field-level differences of a matched pair
///
/// Prefers the source store's type-aware comparison when it advertises one;
/// otherwise falls back to value equality over the fields both stores can
/// read.
fn field_differences(
    source: &dyn ObjectStore,
    source_object: &ObjectHandle,
    target: &dyn ObjectStore,
    target_object: &ObjectHandle,
    ty: &TypeTag,
) -> Vec<FieldDelta> {
    if let Some((equal, deltas)) = source.compare_objects(source_object, target, target_object) {
        return if equal { Vec::new() } else { deltas };
    }

    let shared: BTreeSet<FieldName> = {
        let readable: BTreeSet<FieldName> = source.readable_fields(ty).into_iter().collect();
        let theirs: BTreeSet<FieldName> = target.readable_fields(ty).into_iter().collect();
        readable.intersection(&theirs).cloned().collect()
    };

    let mut deltas = Vec::new();
    for field in shared {
        let ours = source.read_field(source_object, &field).ok().flatten();
        let theirs = target.read_field(target_object, &field).ok().flatten();
        if ours != theirs {
            deltas.push(FieldDelta {
                field,
                old: theirs,
                new: ours,
            });
        }
    }
    deltas
}
