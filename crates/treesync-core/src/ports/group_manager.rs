//! Group manager port (driven/secondary port)
//!
//! Resolves sync group names to their folders. Each folder maps to one
//! history and one filter, which is what the synchronizer consumes.
//!
//! ## Design Notes
//!
//! - Group and folder names compare case-insensitively.
//! - Creation is rejected when the name is taken; existing state is left
//!   untouched.

use thiserror::Error;

use crate::config::{SyncFolder, SyncGroup};
use crate::domain::DomainError;

/// Errors returned by [`IGroupManager`]
#[derive(Debug, Error)]
pub enum GroupError {
    /// No group with this name exists
    #[error("sync group not found: {0}")]
    NotFound(String),

    /// A group with this name already exists
    #[error("sync group already exists: {0}")]
    Duplicate(String),

    /// The group already has a folder with this name
    #[error("sync group {group} already contains folder {folder}")]
    DuplicateFolder { group: String, folder: String },

    /// Invalid group or folder definition
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage error
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Port trait for managing sync groups
pub trait IGroupManager: Send + Sync {
    /// Names of all groups
    fn groups(&self) -> Result<Vec<String>, GroupError>;

    /// Resolves a group by name
    fn get_group(&self, name: &str) -> Result<SyncGroup, GroupError>;

    /// Creates an empty group
    fn add_group(&self, name: &str) -> Result<SyncGroup, GroupError>;

    /// Deletes a group
    fn remove_group(&self, name: &str) -> Result<(), GroupError>;

    /// Adds a folder to an existing group
    fn add_folder(&self, group: &str, folder: SyncFolder) -> Result<SyncGroup, GroupError>;
}
