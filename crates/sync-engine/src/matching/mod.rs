//! Match strategies for pairing source objects with target candidates
//!
//! This module provides:
//! - **strategy**: the [`MatchStrategy`] trait all strategies implement
//! - **guid**: [`GuidMatch`], pairing by persistent identifier
//! - **field**: [`FieldMatch`], pairing by configured field equality
//! - **hybrid**: [`HybridMatch`], identifier first with field fallback
//!
//! Strategies are stateless; the engine owns an instance-level registry of
//! them keyed by [`MatchStrategy::name`] so callers can select one by
//! string or pass an instance directly.

mod field;
mod guid;
mod hybrid;
mod strategy;

pub use field::{FieldExtractor, FieldMatch};
pub use guid::GuidMatch;
pub use hybrid::HybridMatch;
pub use strategy::MatchStrategy;
