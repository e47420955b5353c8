//! Object identity types
//!
//! Two layers of identity exist side by side:
//!
//! - [`PersistentId`]: a stable identifier that survives across stores
//!   sharing lineage. Matching and dependency ordering work on these.
//! - [`ObjectHandle`]: an ephemeral, store-local handle returned by an
//!   [`crate::ObjectStore`]. Handles from one store mean nothing to another.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of a field on a domain object
pub type FieldName = String;

/// Generic field value currency
///
/// Field values cross the repository capability boundary as JSON values so
/// the engine never needs type-specific accessors.
pub type FieldValue = serde_json::Value;

/// Stable, store-independent identifier for a domain object
///
/// Two stores that share lineage assign the same `PersistentId` to the same
/// logical object; a freshly created object receives a random one. Ordering
/// is total and deterministic, which the import order relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersistentId(Uuid);

impl PersistentId {
    /// Generate a fresh random identifier
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PersistentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PersistentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Tag naming a domain object type (e.g. `"entry"`, `"sense"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// Ephemeral handle to an object inside one particular store
///
/// The raw value is meaningful only to the store that issued it. The type
/// tag rides along so callers never have to ask the store which accessor
/// table applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    raw: u64,
    ty: TypeTag,
}

impl ObjectHandle {
    /// Construct a handle. Only object stores should call this.
    pub fn new(raw: u64, ty: TypeTag) -> Self {
        Self { raw, ty }
    }

    /// Store-local raw value
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// Type of the object this handle refers to
    pub fn type_tag(&self) -> &TypeTag {
        &self.ty
    }
}
