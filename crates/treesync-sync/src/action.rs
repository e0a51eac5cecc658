//! Sync actions
//!
//! A [`SyncAction`] is an intended mutation of one participant's tree. It is
//! an immutable value identified by its [`SyncActionId`].

use std::fmt;

use serde::{Deserialize, Serialize};

use treesync_core::domain::{path, FileReference, SyncActionId};

use crate::error::SyncError;

/// One side of a synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SyncParticipant {
    Left = 0,
    Right = 1,
}

impl SyncParticipant {
    /// The opposite participant
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl TryFrom<u8> for SyncParticipant {
    type Error = SyncError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            other => Err(SyncError::Serialization(format!(
                "invalid sync participant: {other}"
            ))),
        }
    }
}

impl From<SyncParticipant> for u8 {
    fn from(participant: SyncParticipant) -> Self {
        participant as u8
    }
}

impl fmt::Display for SyncParticipant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// What a [`SyncAction`] does to its target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncActionKind {
    /// Create a file that does not exist on the target yet
    AddFile { new_file: FileReference },
    /// Delete a file, provided it is still the recorded version
    RemoveFile { removed_file: FileReference },
    /// Swap one version of a file for another
    ReplaceFile {
        old_version: FileReference,
        new_version: FileReference,
    },
}

/// A mutation targeted at one participant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncAction {
    id: SyncActionId,
    target: SyncParticipant,
    kind: SyncActionKind,
}

impl SyncAction {
    pub fn add_file(target: SyncParticipant, new_file: FileReference) -> Self {
        Self {
            id: SyncActionId::new(),
            target,
            kind: SyncActionKind::AddFile { new_file },
        }
    }

    pub fn remove_file(target: SyncParticipant, removed_file: FileReference) -> Self {
        Self {
            id: SyncActionId::new(),
            target,
            kind: SyncActionKind::RemoveFile { removed_file },
        }
    }

    /// # Errors
    /// [`SyncError::InvalidAction`] if the two versions have different paths
    pub fn replace_file(
        target: SyncParticipant,
        old_version: FileReference,
        new_version: FileReference,
    ) -> Result<Self, SyncError> {
        if !path::eq_ignore_case(old_version.path(), new_version.path()) {
            return Err(SyncError::InvalidAction(format!(
                "cannot replace {} with a file at a different path ({})",
                old_version.path(),
                new_version.path()
            )));
        }
        Ok(Self {
            id: SyncActionId::new(),
            target,
            kind: SyncActionKind::ReplaceFile {
                old_version,
                new_version,
            },
        })
    }

    /// Same action with an explicit id
    #[must_use]
    pub fn with_id(mut self, id: SyncActionId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> SyncActionId {
        self.id
    }

    pub fn target(&self) -> SyncParticipant {
        self.target
    }

    pub fn kind(&self) -> &SyncActionKind {
        &self.kind
    }

    /// Path of the file the action touches
    pub fn file_path(&self) -> &str {
        match &self.kind {
            SyncActionKind::AddFile { new_file } => new_file.path(),
            SyncActionKind::RemoveFile { removed_file } => removed_file.path(),
            SyncActionKind::ReplaceFile { new_version, .. } => new_version.path(),
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            SyncActionKind::AddFile { .. } => "add",
            SyncActionKind::RemoveFile { .. } => "remove",
            SyncActionKind::ReplaceFile { .. } => "replace",
        };
        write!(f, "{verb} {} on {}", self.file_path(), self.target)
    }
}
