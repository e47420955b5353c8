//! Domain object model for the object-sync workspace
//!
//! This crate defines the vocabulary shared by every other crate:
//!
//! - **Identity**: [`PersistentId`] (stable across stores) and
//!   [`ObjectHandle`] (ephemeral, store-local)
//! - **Repository capability**: the [`ObjectStore`] trait through which the
//!   engine enumerates, creates, and reads/writes domain objects without any
//!   type-specific field logic
//! - **Field catalog**: [`FieldCatalog`], the per-type table of fields that
//!   are copyable between a concrete source/target store pair
//! - **Validation**: [`ValidationIssue`], [`ValidationResult`], and the
//!   [`Validator`] collaborator seam
//!
//! # Architecture
//!
//! `sync-model` is a Layer 0 crate: it depends on nothing else in the
//! workspace and is consumed by `sync-graph`, `sync-engine`, and the test
//! fixtures.

pub mod catalog;
pub mod error;
pub mod object;
pub mod store;
pub mod validation;

pub use catalog::FieldCatalog;
pub use error::{Error, Result};
pub use object::{FieldName, FieldValue, ObjectHandle, PersistentId, TypeTag};
pub use store::{FieldDelta, ObjectStore};
pub use validation::{Severity, ValidationIssue, ValidationResult, Validator};
