//! Error types for synchronization

use thiserror::Error;

use treesync_core::domain::DomainError;

/// Errors that can occur while building or applying sync actions
#[derive(Debug, Error)]
pub enum SyncError {
    /// The action's precondition does not hold for the target tree
    #[error("action not applicable: {0}")]
    NotApplicable(String),

    /// Conflicts were present where only resolved actions are allowed
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Persisted action data could not be read or written
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An action was constructed from inconsistent file versions
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// An edge referenced a value that has no node in the change graph
    #[error("change graph error: {0}")]
    Graph(String),

    /// A domain-level error propagated from treesync-core
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
