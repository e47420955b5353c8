//! Error types for sync-engine

use sync_model::ValidationResult;

/// Result type for sync-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in engine operations
///
/// Per-object failures during a batch are not represented here; they are
/// isolated into the run's [`crate::SyncResult`] error log. An `Error`
/// value always means the whole run was refused or aborted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No match strategy registered under this name
    #[error("Unknown match strategy: {name}")]
    UnknownStrategy { name: String },

    /// No conflict resolver registered under this name
    #[error("Unknown conflict resolver: {name}")]
    UnknownResolver { name: String },

    /// A mutating run was requested against a read-only target
    #[error("Target store '{store}' is not writable")]
    ReadOnlyTarget { store: String },

    /// Validation found critical issues; the batch was aborted
    #[error("Validation failed with {} critical issue(s)", result.critical_issues().len())]
    Validation { result: ValidationResult },

    /// Error from a repository collaborator
    #[error(transparent)]
    Model(#[from] sync_model::Error),

    /// The import graph contains a cycle the configuration does not tolerate
    #[error(transparent)]
    Cycle(#[from] sync_graph::CircularDependencyError),

    /// Import configuration failed to parse
    #[error(transparent)]
    Config(#[from] toml::de::Error),

    /// Standard I/O error (configuration loading)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
