//! Conflicts the synchronizer cannot resolve on its own

use std::fmt;

use treesync_core::domain::{ConflictInfo, FileReference, MultiSnapshotId};

use crate::error::SyncError;

/// A divergence that blocks automatic application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncConflict {
    /// Several different versions of one path are current
    ///
    /// `None` in `versions` stands for "deleted".
    MultipleVersion {
        file_path: String,
        versions: Vec<Option<FileReference>>,
        description: String,
    },
    /// One side modified the file while the other deleted it
    ModificationDeletion {
        file_path: String,
        modified: FileReference,
        deleted: FileReference,
        description: String,
    },
}

impl SyncConflict {
    pub fn multiple_version(
        file_path: impl Into<String>,
        versions: Vec<Option<FileReference>>,
    ) -> Self {
        let file_path = file_path.into();
        let description = format!(
            "{} conflicting versions of {file_path}",
            versions.len()
        );
        Self::MultipleVersion {
            file_path,
            versions,
            description,
        }
    }

    /// `deleted` is the last version the deleting side had
    pub fn modification_deletion(
        file_path: impl Into<String>,
        modified: FileReference,
        deleted: FileReference,
    ) -> Self {
        let file_path = file_path.into();
        let description = format!("{file_path} was modified on one side and deleted on the other");
        Self::ModificationDeletion {
            file_path,
            modified,
            deleted,
            description,
        }
    }

    pub fn file_path(&self) -> &str {
        match self {
            Self::MultipleVersion { file_path, .. }
            | Self::ModificationDeletion { file_path, .. } => file_path,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::MultipleVersion { description, .. }
            | Self::ModificationDeletion { description, .. } => description,
        }
    }

    /// Record of this conflict found at `snapshot`, ready to be persisted
    pub fn to_conflict_info(
        &self,
        snapshot: Option<&MultiSnapshotId>,
    ) -> Result<ConflictInfo, SyncError> {
        Ok(ConflictInfo::new(self.file_path(), snapshot.cloned())?)
    }
}

impl fmt::Display for SyncConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
