//! Dependency graph and import ordering for object-sync
//!
//! This crate provides the directed graph the hierarchical importer builds
//! before touching the target store:
//!
//! - **Typed edges**: every dependency carries a [`DependencyKind`]
//!   (ownership, reference, or cross-reference) so cycle breaking can sever
//!   the weakest link first
//! - **Deterministic ordering**: [`DependencyGraph::get_import_order`] runs
//!   Kahn's algorithm with a lexicographic tie-break, so the same graph
//!   always yields the same sequence
//! - **Cycle detection**: [`DependencyGraph::detect_cycles`] walks the graph
//!   with an iterative depth-first search and reports every discovered cycle
//!
//! # Example
//!
//! ```
//! use sync_graph::{DependencyGraph, DependencyKind};
//! use sync_model::{PersistentId, TypeTag};
//!
//! let entry = PersistentId::random();
//! let sense = PersistentId::random();
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_object(entry, TypeTag::from("entry"), None);
//! graph.add_object(sense, TypeTag::from("sense"), None);
//! // The sense is owned by the entry, so the entry must be created first.
//! graph.add_dependency(sense, entry, DependencyKind::Ownership);
//!
//! let order = graph.get_import_order().unwrap();
//! assert_eq!(order[0].0, entry);
//! assert_eq!(order[1].0, sense);
//! ```

pub mod error;
pub mod graph;
pub mod node;

pub use error::{CircularDependencyError, Result};
pub use graph::DependencyGraph;
pub use node::{DependencyKind, DependencyNode};
