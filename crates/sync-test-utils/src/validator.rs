//! Scripted validation collaborator

use std::collections::HashMap;

use sync_model::{
    ObjectHandle, ObjectStore, PersistentId, TypeTag, ValidationIssue, ValidationResult, Validator,
};

/// Validator returning pre-seeded issues per object identifier
///
/// Objects with no scripted issues validate clean.
#[derive(Debug, Default)]
pub struct StaticValidator {
    issues: HashMap<PersistentId, Vec<ValidationIssue>>,
}

impl StaticValidator {
    /// A validator that accepts everything
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Script an issue for one object
    pub fn with_issue(mut self, id: PersistentId, issue: ValidationIssue) -> Self {
        self.issues.entry(id).or_default().push(issue);
        self
    }
}

impl Validator for StaticValidator {
    fn validate_before_create(
        &self,
        object: &ObjectHandle,
        source: &dyn ObjectStore,
        _ty: &TypeTag,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if let Ok(id) = source.guid_of(object) {
            if let Some(issues) = self.issues.get(&id) {
                for issue in issues {
                    result.push(issue.clone());
                }
            }
        }
        result
    }
}
