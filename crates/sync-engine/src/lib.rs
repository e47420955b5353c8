//! Synchronization and hierarchical import engine
//!
//! The engine moves objects between two [`sync_model::ObjectStore`]
//! implementations without knowing anything about their concrete object
//! models:
//!
//! - **Diffing**: [`DiffEngine`] pairs source objects with target
//!   candidates through a pluggable [`MatchStrategy`] and classifies each
//!   pair into a [`ChangeKind`]
//! - **Syncing**: [`SyncEngine`] applies a diff to the target, arbitrating
//!   modified pairs through a [`ConflictResolver`], with per-object error
//!   isolation and full dry-run support
//! - **Importing**: [`HierarchicalImporter`] expands requested objects into
//!   a dependency graph and creates them in topological order, so owners
//!   and referenced objects exist before anything that needs them
//!
//! Every mutating entry point takes a dry-run switch and produces a
//! [`SyncResult`] audit trail; destructive operations (deletes) are
//! reported but never applied automatically.
//!
//! # Example
//!
//! ```
//! use sync_engine::{SyncEngine, SyncOptions};
//! use sync_model::{PersistentId, TypeTag};
//! use sync_test_utils::MemoryStore;
//!
//! let mut source = MemoryStore::new("source").with_type("entry", &["headword"]);
//! source.seed_object("entry", PersistentId::random());
//! let target = MemoryStore::new("target").with_type("entry", &["headword"]);
//!
//! let mut engine = SyncEngine::new(Box::new(source), Box::new(target));
//! let result = engine
//!     .sync(&TypeTag::from("entry"), &SyncOptions::default(), None)
//!     .unwrap();
//! assert!(result.success());
//! assert_eq!(result.num_created, 1);
//! ```

pub mod conflict;
pub mod diff;
pub mod engine;
pub mod error;
pub mod importer;
pub mod matching;
pub mod merge;
pub mod progress;
pub mod result;

pub use conflict::{ConflictResolver, RuleBased, SourceWins, TargetWins, Winner};
pub use diff::{Change, ChangeKind, DiffEngine, DiffResult, ObjectFilter};
pub use engine::{CompareOptions, SyncEngine, SyncOptions};
pub use error::{Error, Result};
pub use importer::{
    DependencyResolver, HierarchicalImporter, ImportConfig, ImportOptions, RelationResolver,
};
pub use matching::{FieldExtractor, FieldMatch, GuidMatch, HybridMatch, MatchStrategy};
pub use merge::MergeOperations;
pub use progress::{Phase, ProgressEvent, ProgressFn};
pub use result::{AppliedAction, AppliedChange, SyncErrorEntry, SyncResult};
