//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Absent keys are never reported through this type; lookups return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Count capacity outside the accepted range (>= 2, or unbounded)
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Byte budget below one byte
    #[error("Invalid byte budget: {0} (must be at least 1)")]
    InvalidByteBudget(usize),

    /// Value cannot report a byte length
    #[error("Unsupported value: {0} does not report a byte length")]
    UnsupportedValue(String),

    /// Internal ordering/index structures disagree
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Unparsable driver input
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
