//! Validation collaborator types
//!
//! Validation is pluggable: the engine never knows concrete rules, it only
//! aggregates [`ValidationIssue`]s and gates batch imports on the presence
//! of critical ones.

use serde::{Deserialize, Serialize};

use crate::object::{ObjectHandle, PersistentId, TypeTag};
use crate::store::ObjectStore;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice
    Info,
    /// Potential problem, does not block an import
    Warning,
    /// Blocks a non-dry-run import of the whole batch
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A single issue reported by a validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity
    pub severity: Severity,
    /// Rule family that produced the issue (e.g. "references")
    pub category: String,
    /// Type of the offending object
    pub ty: TypeTag,
    /// Persistent identifier of the offending object
    pub id: PersistentId,
    /// Human-readable description
    pub message: String,
    /// Optional extra detail
    pub details: Option<String>,
}

impl ValidationIssue {
    /// Convenience constructor for a critical issue
    pub fn critical(
        category: impl Into<String>,
        ty: TypeTag,
        id: PersistentId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Critical,
            category: category.into(),
            ty,
            id,
            message: message.into(),
            details: None,
        }
    }

    /// Convenience constructor for a warning
    pub fn warning(
        category: impl Into<String>,
        ty: TypeTag,
        id: PersistentId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            category: category.into(),
            ty,
            id,
            message: message.into(),
            details: None,
        }
    }
}

/// Aggregated outcome of validating one or more objects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All issues, in discovery order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// A result with no issues
    pub fn ok() -> Self {
        Self::default()
    }

    /// Add an issue
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Fold another result's issues into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    /// Whether any critical issue is present
    pub fn has_critical(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == Severity::Critical)
    }

    /// All critical issues
    pub fn critical_issues(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Collaborator that judges objects before they are created in the target
///
/// Purely advisory unless a [`Severity::Critical`] issue is returned.
pub trait Validator {
    fn validate_before_create(
        &self,
        object: &ObjectHandle,
        source: &dyn ObjectStore,
        ty: &TypeTag,
    ) -> ValidationResult;
}
