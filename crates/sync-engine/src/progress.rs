//! Advisory progress reporting
//!
//! Progress callbacks exist purely for operator feedback. They must not
//! block or mutate engine state, and a run produces identical results with
//! or without one attached.

/// Phase of a run a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Pairing source and target objects
    Compare,
    /// Applying changes to the target
    Apply,
    /// Expanding dependency graphs
    Resolve,
    /// Validating nodes before import
    Validate,
    /// Creating objects in import order
    Import,
}

/// One advisory progress tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    /// 1-based index of the item just processed
    pub current: usize,
    pub total: usize,
}

/// Callback signature accepted by engine entry points
pub type ProgressFn<'a> = &'a mut dyn FnMut(ProgressEvent);

pub(crate) fn emit(progress: &mut Option<ProgressFn<'_>>, phase: Phase, current: usize, total: usize) {
    if let Some(callback) = progress {
        callback(ProgressEvent {
            phase,
            current,
            total,
        });
    }
}
