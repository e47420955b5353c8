//! Graph node and edge types

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sync_model::{ObjectHandle, PersistentId, TypeTag};

/// Kind of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The dependent is a structural part of its target; the owner must
    /// exist before the dependent can be created
    Ownership,
    /// The dependent points at another object it does not own
    Reference,
    /// A weak, bidirectional relationship; the first edge kind severed when
    /// breaking cycles
    CrossReference,
}

impl DependencyKind {
    /// Rank used when breaking cycles: lower is severed first
    ///
    /// Ownership edges rank last because removing one misorders
    /// parent/child creation.
    pub fn break_rank(&self) -> u8 {
        match self {
            Self::CrossReference => 0,
            Self::Reference => 1,
            Self::Ownership => 2,
        }
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ownership => write!(f, "ownership"),
            Self::Reference => write!(f, "reference"),
            Self::CrossReference => write!(f, "cross-reference"),
        }
    }
}

/// One node in the dependency graph
///
/// Invariant: an edge `a -> b` (a depends on b) is recorded on both ends,
/// `a.dependencies` containing `b` and `b.dependents` containing `a`. The
/// graph adds and removes the two sides together; nothing else mutates them.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    /// Persistent identifier of the object this node stands for
    pub id: PersistentId,
    /// Object type
    pub ty: TypeTag,
    /// Handle into the source store, absent for objects known only by
    /// identifier (e.g. presumed to already exist in the target)
    pub payload: Option<ObjectHandle>,
    /// Identifiers this node depends on
    pub dependencies: BTreeSet<PersistentId>,
    /// Identifiers that depend on this node
    pub dependents: BTreeSet<PersistentId>,
    /// Edge kind per dependency target
    pub edge_kinds: BTreeMap<PersistentId, DependencyKind>,
}

impl DependencyNode {
    pub fn new(id: PersistentId, ty: TypeTag, payload: Option<ObjectHandle>) -> Self {
        Self {
            id,
            ty,
            payload,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            edge_kinds: BTreeMap::new(),
        }
    }

    /// Number of nodes this one depends on (the Kahn in-degree)
    pub fn in_degree(&self) -> usize {
        self.dependencies.len()
    }
}
