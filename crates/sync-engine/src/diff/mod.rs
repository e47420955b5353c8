//! Structured diffing of two object populations
//!
//! This module provides:
//! - **change**: [`Change`], [`ChangeKind`], and the bucketed [`DiffResult`]
//! - **engine**: [`DiffEngine::compare`], pairing every source object with a
//!   target candidate via a match strategy and classifying the outcome

mod change;
mod engine;

pub use change::{Change, ChangeKind, DiffResult};
pub use engine::{DiffEngine, ObjectFilter};
