//! The repository capability interface
//!
//! Every core component talks to the two data stores exclusively through
//! [`ObjectStore`]. The trait is deliberately narrow: enumerate objects,
//! create one alongside an optional parent, read and write named fields,
//! and report persistent identity. Richer, type-aware capabilities
//! ([`ObjectStore::syncable_properties`], [`ObjectStore::compare_objects`])
//! are optional; their absence degrades gracefully to generic field-pair
//! comparison in the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::object::{FieldName, FieldValue, ObjectHandle, PersistentId, TypeTag};

/// One field-level difference between two matched objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDelta {
    /// Field the difference was observed on
    pub field: FieldName,
    /// Value on the target side, if readable
    pub old: Option<FieldValue>,
    /// Value on the source side, if readable
    pub new: Option<FieldValue>,
}

/// Capability interface of a domain object repository
///
/// Implementations wrap an actual data store. Handles returned by one store
/// must never be passed to another; cross-store identity travels only as
/// [`PersistentId`].
///
/// Mutating methods take `&mut self`; the engine assumes exclusive,
/// uncontended access to the target store for the duration of a run and
/// performs no locking of its own.
pub trait ObjectStore {
    /// Short human-readable name used in logs and error messages
    fn name(&self) -> &str;

    /// Whether mutating calls are permitted at all
    fn is_writable(&self) -> bool;

    /// Enumerate all objects of `ty`, optionally restricted to the children
    /// of `parent`. Enumeration order must be stable within a run.
    fn all_objects(&self, ty: &TypeTag, parent: Option<&ObjectHandle>) -> Result<Vec<ObjectHandle>>;

    /// Look up an object by persistent identifier
    fn get_object(&self, ty: &TypeTag, id: PersistentId) -> Result<Option<ObjectHandle>>;

    /// Whether an object with this identifier exists
    fn contains(&self, ty: &TypeTag, id: PersistentId) -> bool {
        matches!(self.get_object(ty, id), Ok(Some(_)))
    }

    /// Create an empty object of `ty` carrying the given persistent
    /// identifier, optionally owned by `parent`
    ///
    /// The identifier is supplied by the caller (it is the template object's
    /// identity) so that lineage is preserved across stores.
    fn create_object(
        &mut self,
        ty: &TypeTag,
        id: PersistentId,
        parent: Option<&ObjectHandle>,
    ) -> Result<ObjectHandle>;

    /// Delete an object
    fn delete_object(&mut self, object: &ObjectHandle) -> Result<()>;

    /// Persistent identifier of an object
    fn guid_of(&self, object: &ObjectHandle) -> Result<PersistentId>;

    /// Fields of `ty` this store can read
    ///
    /// This is the statically resolved replacement for accessor-pair
    /// discovery: a field is copyable between two stores exactly when the
    /// source lists it here and the target lists it in
    /// [`ObjectStore::writable_fields`].
    fn readable_fields(&self, ty: &TypeTag) -> Vec<FieldName>;

    /// Fields of `ty` this store can write
    fn writable_fields(&self, ty: &TypeTag) -> Vec<FieldName>;

    /// Read a named field. `Ok(None)` means the field exists but holds no
    /// value for this object.
    fn read_field(&self, object: &ObjectHandle, field: &str) -> Result<Option<FieldValue>>;

    /// Write a named field
    fn write_field(&mut self, object: &ObjectHandle, field: &str, value: FieldValue) -> Result<()>;

    /// Optional: flattened property map for richer diffing
    ///
    /// Stores that can cheaply project an object to a map of syncable
    /// properties may override this; the default reports the capability as
    /// absent.
    fn syncable_properties(
        &self,
        _object: &ObjectHandle,
    ) -> Option<BTreeMap<FieldName, FieldValue>> {
        None
    }

    /// Optional: type-aware structured comparison of `ours` against
    /// `theirs` in `other`
    ///
    /// Returns `(equal, deltas)` when the store supports content-level
    /// comparison for this type, `None` otherwise.
    fn compare_objects(
        &self,
        _ours: &ObjectHandle,
        _other: &dyn ObjectStore,
        _theirs: &ObjectHandle,
    ) -> Option<(bool, Vec<FieldDelta>)> {
        None
    }
}
