//! Hierarchical, dependency-ordered import
//!
//! This module provides:
//! - **config**: [`ImportConfig`], TOML-loadable knobs for graph expansion
//! - **resolver**: the [`DependencyResolver`] collaborator seam plus
//!   [`RelationResolver`], a generic implementation driven by declared
//!   ownership and reference relations
//! - **hierarchical**: [`HierarchicalImporter`], which expands requested
//!   objects into one combined graph, breaks tolerated cycles, validates,
//!   and creates objects in import order with per-object error isolation

mod config;
mod hierarchical;
mod resolver;

pub use config::ImportConfig;
pub use hierarchical::{HierarchicalImporter, ImportOptions};
pub use resolver::{DependencyResolver, RelationResolver};
