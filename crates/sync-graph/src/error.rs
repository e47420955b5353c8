//! Error types for sync-graph

use sync_model::PersistentId;

/// Result type for graph operations that can hit a cycle
pub type Result<T> = std::result::Result<T, CircularDependencyError>;

/// The graph contains a cycle and no order exists
///
/// Carries the first discovered cycle as a path whose consecutive pairs are
/// dependency edges; the last element repeats the first.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Circular dependency detected: {}", format_cycle(cycle))]
pub struct CircularDependencyError {
    /// The offending cycle, closing back on its first node
    pub cycle: Vec<PersistentId>,
}

fn format_cycle(cycle: &[PersistentId]) -> String {
    cycle
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
