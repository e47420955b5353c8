//! Create/update/delete operations against the target store
//!
//! Field copy is driven by the [`FieldCatalog`]: only fields the source can
//! read and the target can write are touched. Copy is best-effort per
//! field; the source and target object models only partially overlap, so a
//! single field failing to read or write is logged and skipped, never fatal
//! to the whole copy.

use sync_model::{FieldCatalog, ObjectHandle, ObjectStore};

use crate::error::Result;

/// Generic create/update/delete against the target repository
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOperations;

impl MergeOperations {
    /// Create a target counterpart of `source_object`, copying every
    /// copyable field whose value differs
    ///
    /// The new object carries the source object's persistent identifier so
    /// later runs can pair the two by identity.
    pub fn create_object(
        &self,
        target: &mut dyn ObjectStore,
        source_object: &ObjectHandle,
        source: &dyn ObjectStore,
        parent: Option<&ObjectHandle>,
    ) -> Result<ObjectHandle> {
        let ty = source_object.type_tag().clone();
        let id = source.guid_of(source_object)?;
        let created = target.create_object(&ty, id, parent)?;
        let copied = copy_fields(target, &created, source, source_object)?;
        tracing::debug!(ty = %ty, id = %id, copied, "created object");
        Ok(created)
    }

    /// Copy differing fields onto an existing target object
    ///
    /// Returns whether any field actually changed, so a second call with an
    /// unchanged source is a no-op returning `false`.
    pub fn update_object(
        &self,
        target: &mut dyn ObjectStore,
        target_object: &ObjectHandle,
        source: &dyn ObjectStore,
        source_object: &ObjectHandle,
    ) -> Result<bool> {
        let copied = copy_fields(target, target_object, source, source_object)?;
        Ok(copied > 0)
    }

    /// Delete an object from the target
    ///
    /// `validate_safe` is accepted as a hook for future reference-safety
    /// checks; no policy is specified yet, so deletion always proceeds.
    pub fn delete_object(
        &self,
        target: &mut dyn ObjectStore,
        object: &ObjectHandle,
        validate_safe: bool,
    ) -> Result<()> {
        if validate_safe {
            tracing::debug!(
                ty = %object.type_tag(),
                "reference-safety validation requested but no policy is defined, proceeding"
            );
        }
        target.delete_object(object)?;
        Ok(())
    }
}

/// Copy every cataloged field whose value differs; returns how many were
/// written
///
/// A failure on one field is logged and skipped. Fields the source holds no
/// value for are left alone rather than cleared.
fn copy_fields(
    target: &mut dyn ObjectStore,
    target_object: &ObjectHandle,
    source: &dyn ObjectStore,
    source_object: &ObjectHandle,
) -> Result<usize> {
    let catalog = FieldCatalog::resolve(source, target, source_object.type_tag());

    let mut copied = 0;
    for field in catalog.fields() {
        let value = match source.read_field(source_object, field) {
            Ok(Some(value)) => value,
            Ok(None) => continue,
            Err(error) => {
                tracing::debug!(field, %error, "skipping unreadable field");
                continue;
            }
        };

        let current = target.read_field(target_object, field).ok().flatten();
        if current.as_ref() == Some(&value) {
            continue;
        }

        match target.write_field(target_object, field, value) {
            Ok(()) => copied += 1,
            Err(error) => {
                tracing::debug!(field, %error, "skipping unwritable field");
            }
        }
    }
    Ok(copied)
}
