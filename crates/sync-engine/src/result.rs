//! Run outcome accumulator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sync_model::{PersistentId, TypeTag};

/// What was done (or would have been done) to one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedAction {
    Created,
    Updated,
    Skipped,
}

/// One entry in the audit trail of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedChange {
    pub action: AppliedAction,
    pub ty: TypeTag,
    pub id: Option<PersistentId>,
    /// Why the object was skipped, for [`AppliedAction::Skipped`] entries
    pub reason: Option<String>,
}

/// One isolated per-object failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncErrorEntry {
    pub ty: TypeTag,
    pub id: Option<PersistentId>,
    pub message: String,
}

/// Accumulated outcome of a sync or import run
///
/// Counts, an ordered log of applied changes, and an ordered log of
/// isolated errors. [`SyncResult::success`] holds exactly when the error
/// log is empty; skipped objects (including never-auto-applied deletes) do
/// not count as failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Whether the run was a dry run
    pub dry_run: bool,
    pub num_created: usize,
    pub num_updated: usize,
    pub num_deleted: usize,
    pub num_skipped: usize,
    /// Audit trail, in apply order
    pub changes: Vec<AppliedChange>,
    /// Isolated per-object errors, in occurrence order
    pub errors: Vec<SyncErrorEntry>,
}

impl SyncResult {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            num_created: 0,
            num_updated: 0,
            num_deleted: 0,
            num_skipped: 0,
            changes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Whether the run completed without a single per-object error
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn num_errors(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn record_created(&mut self, ty: TypeTag, id: PersistentId) {
        self.num_created += 1;
        self.changes.push(AppliedChange {
            action: AppliedAction::Created,
            ty,
            id: Some(id),
            reason: None,
        });
    }

    pub(crate) fn record_updated(&mut self, ty: TypeTag, id: PersistentId) {
        self.num_updated += 1;
        self.changes.push(AppliedChange {
            action: AppliedAction::Updated,
            ty,
            id: Some(id),
            reason: None,
        });
    }

    pub(crate) fn record_skipped(
        &mut self,
        ty: TypeTag,
        id: Option<PersistentId>,
        reason: impl Into<String>,
    ) {
        self.num_skipped += 1;
        self.changes.push(AppliedChange {
            action: AppliedAction::Skipped,
            ty,
            id,
            reason: Some(reason.into()),
        });
    }

    pub(crate) fn record_error(
        &mut self,
        ty: TypeTag,
        id: Option<PersistentId>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        tracing::warn!(ty = %ty, id = ?id, message, "isolated per-object error");
        self.errors.push(SyncErrorEntry { ty, id, message });
    }
}
