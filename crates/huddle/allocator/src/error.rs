//! Error types for huddle-allocator.

use thiserror::Error;

/// Errors raised while building an allocator.
///
/// Placement itself never fails; see [`huddle_types::PlacementDecision`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocatorError {
    /// Placement configuration is unusable.
    #[error("invalid placement configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for allocator operations.
pub type AllocatorResult<T> = Result<T, AllocatorError>;
