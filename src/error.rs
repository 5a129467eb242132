//! Unified error types for tree operations.

use thiserror::Error;

/// Node pool refused an allocation.
///
/// Carries the live-node count at the point of refusal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("pool refused a node ({live} live)")]
pub struct AllocError {
    /// Number of live nodes when the pool refused.
    pub live: usize,
}

/// Unified error type for all tree operations.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocError),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(&'static str),

    #[error("Corrupted tree: {0}")]
    Corrupted(String),
}
