//! Change classification types

use serde::{Deserialize, Serialize};
use sync_model::{FieldDelta, PersistentId, TypeTag};

/// Classification of one source/target pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present in the source only
    New,
    /// Matched, with at least one differing field
    Modified,
    /// Present in the target only
    Deleted,
    /// Matched with no differing field
    Unchanged,
    /// Matched but diverged in a way that needs resolver arbitration;
    /// emitted only during apply runs, never by a pure compare
    Conflict,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Conflict => write!(f, "conflict"),
        }
    }
}

/// One classified pairing or singleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Identifier on the source side, absent for [`ChangeKind::Deleted`]
    pub source_id: Option<PersistentId>,
    /// Identifier on the target side, absent for [`ChangeKind::New`]
    pub target_id: Option<PersistentId>,
    pub ty: TypeTag,
    /// Field-level differences, populated for modified pairs
    pub details: Vec<FieldDelta>,
}

impl Change {
    pub fn new_object(source_id: PersistentId, ty: TypeTag) -> Self {
        Self {
            kind: ChangeKind::New,
            source_id: Some(source_id),
            target_id: None,
            ty,
            details: Vec::new(),
        }
    }

    pub fn deleted_object(target_id: PersistentId, ty: TypeTag) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            source_id: None,
            target_id: Some(target_id),
            ty,
            details: Vec::new(),
        }
    }

    pub fn matched(
        kind: ChangeKind,
        source_id: PersistentId,
        target_id: PersistentId,
        ty: TypeTag,
        details: Vec<FieldDelta>,
    ) -> Self {
        Self {
            kind,
            source_id: Some(source_id),
            target_id: Some(target_id),
            ty,
            details,
        }
    }
}

/// Immutable, bucketed outcome of a compare run
///
/// Changes keep their emission order: sources in enumeration order first,
/// then leftover targets. `total` counts actual changes, so unchanged
/// pairings are excluded by definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffResult {
    changes: Vec<Change>,
}

impl DiffResult {
    pub(crate) fn from_changes(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    /// All changes in emission order
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Changes of one kind, preserving order
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn num_new(&self) -> usize {
        self.count(ChangeKind::New)
    }

    pub fn num_modified(&self) -> usize {
        self.count(ChangeKind::Modified)
    }

    pub fn num_deleted(&self) -> usize {
        self.count(ChangeKind::Deleted)
    }

    pub fn num_unchanged(&self) -> usize {
        self.count(ChangeKind::Unchanged)
    }

    pub fn num_conflicts(&self) -> usize {
        self.count(ChangeKind::Conflict)
    }

    /// Number of actual changes; unchanged pairings are not changes
    pub fn total(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Unchanged)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
