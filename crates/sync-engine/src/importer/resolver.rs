//! Dependency resolution collaborator
//!
//! Expanding an object into its dependency graph requires knowing which
//! fields and child collections carry relationships; that knowledge is
//! domain-specific, so it lives behind the [`DependencyResolver`] trait.
//! [`RelationResolver`] is a generic implementation configured with
//! declared relations and driven entirely through the repository
//! capability interface.

use std::collections::{HashMap, HashSet, VecDeque};

use sync_graph::{DependencyGraph, DependencyKind};
use sync_model::{FieldName, FieldValue, ObjectHandle, ObjectStore, PersistentId, TypeTag};
use uuid::Uuid;

use crate::error::Result;

use super::config::ImportConfig;

/// Collaborator that expands an object into its dependency graph
pub trait DependencyResolver {
    /// Build the graph of `object` and everything it owns or references,
    /// honoring `config`
    fn resolve_dependencies(
        &self,
        object: &ObjectHandle,
        ty: &TypeTag,
        source: &dyn ObjectStore,
        config: &ImportConfig,
    ) -> Result<DependencyGraph>;

    /// Objects this object points at through its reference fields
    fn get_referenced_objects(
        &self,
        object: &ObjectHandle,
        ty: &TypeTag,
        source: &dyn ObjectStore,
    ) -> Result<Vec<(ObjectHandle, TypeTag)>>;
}

#[derive(Debug, Clone)]
struct ReferenceField {
    field: FieldName,
    target_ty: TypeTag,
    kind: DependencyKind,
}

/// Generic resolver driven by declared relations
///
/// Ownership is expanded through parent-scoped enumeration
/// ([`ObjectStore::all_objects`] with a parent); references are read from
/// fields holding persistent identifiers, either a single one or an array.
#[derive(Debug, Clone, Default)]
pub struct RelationResolver {
    owned: HashMap<TypeTag, Vec<TypeTag>>,
    references: HashMap<TypeTag, Vec<ReferenceField>>,
}

impl RelationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that objects of `parent_ty` own children of `child_ty`
    pub fn owns(mut self, parent_ty: impl Into<TypeTag>, child_ty: impl Into<TypeTag>) -> Self {
        self.owned
            .entry(parent_ty.into())
            .or_default()
            .push(child_ty.into());
        self
    }

    /// Declare a reference field on `ty` holding identifiers of `target_ty`
    pub fn references_via(
        self,
        ty: impl Into<TypeTag>,
        field: impl Into<FieldName>,
        target_ty: impl Into<TypeTag>,
    ) -> Self {
        self.relation(ty, field, target_ty, DependencyKind::Reference)
    }

    /// Declare a cross-reference field on `ty`, the weakest edge kind
    pub fn cross_references_via(
        self,
        ty: impl Into<TypeTag>,
        field: impl Into<FieldName>,
        target_ty: impl Into<TypeTag>,
    ) -> Self {
        self.relation(ty, field, target_ty, DependencyKind::CrossReference)
    }

    fn relation(
        mut self,
        ty: impl Into<TypeTag>,
        field: impl Into<FieldName>,
        target_ty: impl Into<TypeTag>,
        kind: DependencyKind,
    ) -> Self {
        self.references.entry(ty.into()).or_default().push(ReferenceField {
            field: field.into(),
            target_ty: target_ty.into(),
            kind,
        });
        self
    }

    fn referenced_ids(
        &self,
        source: &dyn ObjectStore,
        object: &ObjectHandle,
        field: &str,
    ) -> Vec<PersistentId> {
        let Ok(Some(value)) = source.read_field(object, field) else {
            return Vec::new();
        };
        parse_ids(&value)
    }
}

/// Identifiers held by a reference field value: a single string or an
/// array of strings. Anything unparsable is logged and ignored.
fn parse_ids(value: &FieldValue) -> Vec<PersistentId> {
    let raw: Vec<&str> = match value {
        FieldValue::String(s) => vec![s.as_str()],
        FieldValue::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    };

    raw.into_iter()
        .filter_map(|s| match Uuid::parse_str(s) {
            Ok(uuid) => Some(PersistentId::from_uuid(uuid)),
            Err(error) => {
                tracing::debug!(value = s, %error, "ignoring unparsable reference value");
                None
            }
        })
        .collect()
}

impl DependencyResolver for RelationResolver {
    fn resolve_dependencies(
        &self,
        object: &ObjectHandle,
        ty: &TypeTag,
        source: &dyn ObjectStore,
        config: &ImportConfig,
    ) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        let root_id = source.guid_of(object)?;
        graph.add_object(root_id, ty.clone(), Some(object.clone()));

        let mut seen: HashSet<PersistentId> = HashSet::from([root_id]);
        let mut queue: VecDeque<(ObjectHandle, usize)> = VecDeque::from([(object.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            let current_ty = current.type_tag().clone();
            let current_id = source.guid_of(&current)?;

            if config.include_owned && depth < config.max_depth {
                for child_ty in self.owned.get(&current_ty).into_iter().flatten() {
                    if !config.allows_owned_type(child_ty) {
                        continue;
                    }
                    for child in source.all_objects(child_ty, Some(&current))? {
                        let child_id = source.guid_of(&child)?;
                        graph.add_object(child_id, child_ty.clone(), Some(child.clone()));
                        // An owned child must be created after its owner.
                        graph.add_dependency(child_id, current_id, DependencyKind::Ownership);
                        if seen.insert(child_id) {
                            queue.push_back((child, depth + 1));
                        }
                    }
                }
            }

            if config.resolve_references {
                for reference in self.references.get(&current_ty).into_iter().flatten() {
                    for target_id in self.referenced_ids(source, &current, &reference.field) {
                        match source.get_object(&reference.target_ty, target_id)? {
                            Some(found) => {
                                graph.add_object(
                                    target_id,
                                    reference.target_ty.clone(),
                                    Some(found.clone()),
                                );
                                graph.add_dependency(current_id, target_id, reference.kind);
                                if seen.insert(target_id) {
                                    queue.push_back((found, depth));
                                }
                            }
                            None => {
                                // Known only by identifier; presumed to
                                // already exist in the target.
                                graph.add_object(target_id, reference.target_ty.clone(), None);
                                graph.add_dependency(current_id, target_id, reference.kind);
                                seen.insert(target_id);
                            }
                        }
                    }
                }
            }
        }

        Ok(graph)
    }

    fn get_referenced_objects(
        &self,
        object: &ObjectHandle,
        ty: &TypeTag,
        source: &dyn ObjectStore,
    ) -> Result<Vec<(ObjectHandle, TypeTag)>> {
        let mut found = Vec::new();
        for reference in self.references.get(ty).into_iter().flatten() {
            for target_id in self.referenced_ids(source, object, &reference.field) {
                if let Some(handle) = source.get_object(&reference.target_ty, target_id)? {
                    found.push((handle, reference.target_ty.clone()));
                }
            }
        }
        Ok(found)
    }
}
