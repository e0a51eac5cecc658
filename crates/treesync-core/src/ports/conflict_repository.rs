//! Conflict repository port (driven/secondary port)
//!
//! Keeps the conflicts a synchronization could not resolve until the user
//! decides on them.
//!
//! ## Design Notes
//!
//! - Records are keyed by file path, ignoring case.
//! - Batch operations are all-or-nothing: when one record of a batch is
//!   rejected, none of the batch is stored or removed.

use thiserror::Error;

use crate::domain::{ConflictInfo, DomainError};

/// Errors returned by [`IConflictRepository`]
#[derive(Debug, Error)]
pub enum ConflictError {
    /// No conflict is recorded for this path
    #[error("no conflict recorded for {0}")]
    NotFound(String),

    /// A conflict is already recorded for this path
    #[error("conflict already recorded for {0}")]
    Duplicate(String),

    /// Invalid path
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage backend error
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Port trait for persisting unresolved conflicts
pub trait IConflictRepository: Send + Sync {
    /// All recorded conflicts, ordered by path (ignoring case)
    fn conflicts(&self) -> Result<Vec<ConflictInfo>, ConflictError>;

    /// Resolves the conflict recorded for `file_path`
    ///
    /// Fails with [`ConflictError::NotFound`] if none is recorded.
    fn get_conflict(&self, file_path: &str) -> Result<ConflictInfo, ConflictError>;

    /// Whether a conflict is recorded for `file_path`
    fn conflict_exists(&self, file_path: &str) -> Result<bool, ConflictError>;

    /// Records every conflict of `conflicts`
    ///
    /// Fails with [`ConflictError::Duplicate`] if a path is already recorded
    /// or appears twice in the batch.
    fn add_conflicts(&self, conflicts: &[ConflictInfo]) -> Result<(), ConflictError>;

    /// Removes every conflict of `conflicts`
    ///
    /// Fails with [`ConflictError::NotFound`] if a path is not recorded.
    fn remove_conflicts(&self, conflicts: &[ConflictInfo]) -> Result<(), ConflictError>;
}
