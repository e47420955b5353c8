//! Per-type field catalog
//!
//! The catalog is resolved once per (source store, target store, type)
//! triple and lists the fields the merge operations may copy: those the
//! source can read and the target can write. Partial overlap between the
//! two stores' object models is expected; fields outside the intersection
//! are simply not copyable.

use std::collections::BTreeSet;

use crate::object::{FieldName, TypeTag};
use crate::store::ObjectStore;

/// Table of copyable fields for one object type between two concrete stores
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    ty: TypeTag,
    fields: Vec<FieldName>,
}

impl FieldCatalog {
    /// Resolve the copyable field set for `ty`
    ///
    /// The result is sorted so that field copy order, and therefore log
    /// output, is deterministic across runs.
    pub fn resolve(source: &dyn ObjectStore, target: &dyn ObjectStore, ty: &TypeTag) -> Self {
        let readable: BTreeSet<FieldName> = source.readable_fields(ty).into_iter().collect();
        let writable: BTreeSet<FieldName> = target.writable_fields(ty).into_iter().collect();

        let fields = readable.intersection(&writable).cloned().collect();
        tracing::debug!(
            ty = %ty,
            source = source.name(),
            target = target.name(),
            "resolved field catalog"
        );

        Self {
            ty: ty.clone(),
            fields,
        }
    }

    /// Type this catalog applies to
    pub fn type_tag(&self) -> &TypeTag {
        &self.ty
    }

    /// Copyable fields, sorted
    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    /// Whether no field is copyable for this type
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
