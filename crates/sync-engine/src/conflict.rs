//! Conflict resolution policies
//!
//! A resolver decides only whose *values* are authoritative when both sides
//! of a matched pair have diverged; it never mutates storage itself.

use serde::{Deserialize, Serialize};
use sync_model::{ObjectHandle, ObjectStore};

use crate::error::Result;

/// Which side a resolver declared authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Source,
    Target,
}

/// Policy for choosing a winner between two diverged objects
pub trait ConflictResolver {
    /// Registry key for this resolver
    fn name(&self) -> &str;

    fn resolve(
        &self,
        source_object: &ObjectHandle,
        target_object: &ObjectHandle,
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
    ) -> Result<Winner>;
}

/// The source side always wins
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceWins;

impl ConflictResolver for SourceWins {
    fn name(&self) -> &str {
        "source-wins"
    }

    fn resolve(
        &self,
        _source_object: &ObjectHandle,
        _target_object: &ObjectHandle,
        _source: &dyn ObjectStore,
        _target: &dyn ObjectStore,
    ) -> Result<Winner> {
        Ok(Winner::Source)
    }
}

/// The target side always wins
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetWins;

impl ConflictResolver for TargetWins {
    fn name(&self) -> &str {
        "target-wins"
    }

    fn resolve(
        &self,
        _source_object: &ObjectHandle,
        _target_object: &ObjectHandle,
        _source: &dyn ObjectStore,
        _target: &dyn ObjectStore,
    ) -> Result<Winner> {
        Ok(Winner::Target)
    }
}

/// Caller-supplied decision rule, the seam for interactive resolution
pub struct RuleBased {
    name: String,
    decide: Box<dyn Fn(&ObjectHandle, &ObjectHandle, &dyn ObjectStore, &dyn ObjectStore) -> Winner>,
}

impl RuleBased {
    pub fn new(
        name: impl Into<String>,
        decide: impl Fn(&ObjectHandle, &ObjectHandle, &dyn ObjectStore, &dyn ObjectStore) -> Winner
        + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            decide: Box::new(decide),
        }
    }
}

impl ConflictResolver for RuleBased {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(
        &self,
        source_object: &ObjectHandle,
        target_object: &ObjectHandle,
        source: &dyn ObjectStore,
        target: &dyn ObjectStore,
    ) -> Result<Winner> {
        Ok((self.decide)(source_object, target_object, source, target))
    }
}
