//! Error types for sync-model

/// Result type for sync-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to an object store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store does not manage objects of the requested type
    #[error("Unknown object type: {ty}")]
    UnknownType { ty: String },

    /// No object with the given persistent identifier exists in the store
    #[error("Object not found: {ty} {id}")]
    ObjectMissing { ty: String, id: String },

    /// A handle refers to an object the store no longer holds
    #[error("Stale object handle in store '{store}'")]
    StaleHandle { store: String },

    /// A mutating call was issued against a store that is not writable
    #[error("Store '{store}' is read-only")]
    ReadOnlyStore { store: String },

    /// Reading a field failed
    #[error("Failed to read field '{field}': {message}")]
    FieldRead { field: String, message: String },

    /// Writing a field failed
    #[error("Failed to write field '{field}': {message}")]
    FieldWrite { field: String, message: String },

    /// Creating an object failed inside the backing store
    #[error("Failed to create {ty} object: {message}")]
    CreateFailed { ty: String, message: String },

    /// Any other failure reported by the backing store
    #[error("Store error: {message}")]
    Backend { message: String },
}
