//! In-memory object store
//!
//! [`MemoryStore`] implements the full repository capability over plain
//! maps. Tests seed it through the builder-style methods and then hand it
//! to the engine like any other store.

use std::collections::{BTreeMap, HashMap};

use sync_model::error::{Error, Result};
use sync_model::{FieldDelta, FieldName, FieldValue, ObjectHandle, ObjectStore, PersistentId, TypeTag};

#[derive(Debug, Clone)]
struct StoredObject {
    ty: TypeTag,
    guid: PersistentId,
    parent: Option<u64>,
    fields: BTreeMap<FieldName, FieldValue>,
}

#[derive(Debug, Clone, Default)]
struct TypeSchema {
    readable: Vec<FieldName>,
    writable: Vec<FieldName>,
}

/// Fully in-memory [`ObjectStore`]
///
/// Enumeration order is creation order, which keeps test expectations
/// stable. Handles are raw counters and stay valid until the object is
/// deleted.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: String,
    writable: bool,
    expose_properties: bool,
    typed_compare: bool,
    next_raw: u64,
    objects: BTreeMap<u64, StoredObject>,
    by_guid: HashMap<(TypeTag, PersistentId), u64>,
    schemas: HashMap<TypeTag, TypeSchema>,
}

impl MemoryStore {
    /// Create an empty writable store
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            writable: true,
            expose_properties: false,
            typed_compare: false,
            next_raw: 0,
            objects: BTreeMap::new(),
            by_guid: HashMap::new(),
            schemas: HashMap::new(),
        }
    }

    /// Mark the store read-only
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Advertise the optional flattened-property capability
    pub fn with_properties(mut self) -> Self {
        self.expose_properties = true;
        self
    }

    /// Advertise the optional type-aware comparison capability
    pub fn with_typed_compare(mut self) -> Self {
        self.typed_compare = true;
        self
    }

    /// Register a type whose fields are both readable and writable
    pub fn with_type(mut self, ty: impl Into<TypeTag>, fields: &[&str]) -> Self {
        let fields: Vec<FieldName> = fields.iter().map(|f| f.to_string()).collect();
        self.schemas.insert(
            ty.into(),
            TypeSchema {
                readable: fields.clone(),
                writable: fields,
            },
        );
        self
    }

    /// Register a type with distinct readable and writable field sets
    pub fn with_asymmetric_type(
        mut self,
        ty: impl Into<TypeTag>,
        readable: &[&str],
        writable: &[&str],
    ) -> Self {
        self.schemas.insert(
            ty.into(),
            TypeSchema {
                readable: readable.iter().map(|f| f.to_string()).collect(),
                writable: writable.iter().map(|f| f.to_string()).collect(),
            },
        );
        self
    }

    /// Seed an object directly, bypassing writability checks
    pub fn seed_object(&mut self, ty: impl Into<TypeTag>, guid: PersistentId) -> ObjectHandle {
        let ty = ty.into();
        let raw = self.next_raw;
        self.next_raw += 1;
        self.objects.insert(
            raw,
            StoredObject {
                ty: ty.clone(),
                guid,
                parent: None,
                fields: BTreeMap::new(),
            },
        );
        self.by_guid.insert((ty.clone(), guid), raw);
        ObjectHandle::new(raw, ty)
    }

    /// Seed a field value directly, bypassing writability checks
    pub fn seed_field(&mut self, object: &ObjectHandle, field: &str, value: FieldValue) {
        if let Some(stored) = self.objects.get_mut(&object.raw()) {
            stored.fields.insert(field.to_string(), value);
        }
    }

    fn stored(&self, object: &ObjectHandle) -> Result<&StoredObject> {
        self.objects.get(&object.raw()).ok_or_else(|| Error::StaleHandle {
            store: self.name.clone(),
        })
    }
}

impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn all_objects(&self, ty: &TypeTag, parent: Option<&ObjectHandle>) -> Result<Vec<ObjectHandle>> {
        Ok(self
            .objects
            .iter()
            .filter(|(_, o)| &o.ty == ty)
            .filter(|(_, o)| match parent {
                Some(p) => o.parent == Some(p.raw()),
                None => true,
            })
            .map(|(raw, o)| ObjectHandle::new(*raw, o.ty.clone()))
            .collect())
    }

    fn get_object(&self, ty: &TypeTag, id: PersistentId) -> Result<Option<ObjectHandle>> {
        Ok(self
            .by_guid
            .get(&(ty.clone(), id))
            .map(|raw| ObjectHandle::new(*raw, ty.clone())))
    }

    fn create_object(
        &mut self,
        ty: &TypeTag,
        id: PersistentId,
        parent: Option<&ObjectHandle>,
    ) -> Result<ObjectHandle> {
        if !self.writable {
            return Err(Error::ReadOnlyStore {
                store: self.name.clone(),
            });
        }
        if !self.schemas.contains_key(ty) {
            return Err(Error::UnknownType { ty: ty.to_string() });
        }
        let raw = self.next_raw;
        self.next_raw += 1;
        self.objects.insert(
            raw,
            StoredObject {
                ty: ty.clone(),
                guid: id,
                parent: parent.map(|p| p.raw()),
                fields: BTreeMap::new(),
            },
        );
        self.by_guid.insert((ty.clone(), id), raw);
        Ok(ObjectHandle::new(raw, ty.clone()))
    }

    fn delete_object(&mut self, object: &ObjectHandle) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnlyStore {
                store: self.name.clone(),
            });
        }
        let stored = self.objects.remove(&object.raw()).ok_or_else(|| Error::StaleHandle {
            store: self.name.clone(),
        })?;
        self.by_guid.remove(&(stored.ty, stored.guid));
        Ok(())
    }

    fn guid_of(&self, object: &ObjectHandle) -> Result<PersistentId> {
        Ok(self.stored(object)?.guid)
    }

    fn readable_fields(&self, ty: &TypeTag) -> Vec<FieldName> {
        self.schemas
            .get(ty)
            .map(|s| s.readable.clone())
            .unwrap_or_default()
    }

    fn writable_fields(&self, ty: &TypeTag) -> Vec<FieldName> {
        self.schemas
            .get(ty)
            .map(|s| s.writable.clone())
            .unwrap_or_default()
    }

    fn read_field(&self, object: &ObjectHandle, field: &str) -> Result<Option<FieldValue>> {
        Ok(self.stored(object)?.fields.get(field).cloned())
    }

    fn write_field(&mut self, object: &ObjectHandle, field: &str, value: FieldValue) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnlyStore {
                store: self.name.clone(),
            });
        }
        let name = self.name.clone();
        let stored = self
            .objects
            .get_mut(&object.raw())
            .ok_or(Error::StaleHandle { store: name })?;
        stored.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn syncable_properties(
        &self,
        object: &ObjectHandle,
    ) -> Option<BTreeMap<FieldName, FieldValue>> {
        if !self.expose_properties {
            return None;
        }
        self.stored(object).ok().map(|o| o.fields.clone())
    }

    fn compare_objects(
        &self,
        ours: &ObjectHandle,
        other: &dyn ObjectStore,
        theirs: &ObjectHandle,
    ) -> Option<(bool, Vec<FieldDelta>)> {
        if !self.typed_compare {
            return None;
        }
        let mine = self.stored(ours).ok()?;
        let mut deltas = Vec::new();
        for (field, value) in &mine.fields {
            let theirs_value = other.read_field(theirs, field).ok().flatten();
            if theirs_value.as_ref() != Some(value) {
                deltas.push(FieldDelta {
                    field: field.clone(),
                    old: theirs_value,
                    new: Some(value.clone()),
                });
            }
        }
        Some((deltas.is_empty(), deltas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_and_enumerate() {
        let mut store = MemoryStore::new("source").with_type("entry", &["headword"]);
        let id = PersistentId::random();
        let handle = store.seed_object("entry", id);
        store.seed_field(&handle, "headword", json!("run"));

        let all = store.all_objects(&TypeTag::from("entry"), None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(store.guid_of(&all[0]).unwrap(), id);
        assert_eq!(
            store.read_field(&all[0], "headword").unwrap(),
            Some(json!("run"))
        );
    }

    #[test]
    fn test_read_only_store_rejects_mutation() {
        let mut store = MemoryStore::new("target")
            .with_type("entry", &["headword"])
            .read_only();
        let result = store.create_object(&TypeTag::from("entry"), PersistentId::random(), None);
        assert!(matches!(result, Err(Error::ReadOnlyStore { .. })));
    }

    #[test]
    fn test_delete_removes_guid_lookup() {
        let mut store = MemoryStore::new("target").with_type("entry", &["headword"]);
        let id = PersistentId::random();
        let handle = store.seed_object("entry", id);
        store.delete_object(&handle).unwrap();
        assert!(!store.contains(&TypeTag::from("entry"), id));
    }

    #[test]
    fn test_optional_capabilities_default_absent() {
        let mut store = MemoryStore::new("source").with_type("entry", &["headword"]);
        let handle = store.seed_object("entry", PersistentId::random());
        assert!(store.syncable_properties(&handle).is_none());

        let other = MemoryStore::new("target").with_type("entry", &["headword"]);
        assert!(store.compare_objects(&handle, &other, &handle).is_none());
    }

    #[test]
    fn test_parent_scoped_enumeration() {
        let mut store = MemoryStore::new("target")
            .with_type("entry", &["headword"])
            .with_type("sense", &["gloss"]);
        let parent_id = PersistentId::random();
        let parent = store
            .create_object(&TypeTag::from("entry"), parent_id, None)
            .unwrap();
        store
            .create_object(&TypeTag::from("sense"), PersistentId::random(), Some(&parent))
            .unwrap();
        store
            .create_object(&TypeTag::from("sense"), PersistentId::random(), None)
            .unwrap();

        let owned = store
            .all_objects(&TypeTag::from("sense"), Some(&parent))
            .unwrap();
        assert_eq!(owned.len(), 1);
    }
}
