//! Error types for the diff engines

use thiserror::Error;

use treesync_core::domain::{DomainError, FileReference, HistoryName};
use treesync_core::ports::StoreError;

/// Errors that can occur while computing diffs
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A snapshot, history or multi-snapshot lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A tree lookup or change construction failed
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No snapshot of the history holds the referenced version
    #[error("no version of {reference} found in history {history}")]
    VersionNotFound {
        history: HistoryName,
        reference: FileReference,
    },
}
