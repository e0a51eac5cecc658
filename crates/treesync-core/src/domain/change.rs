//! Changes between snapshots
//!
//! A [`Change`] is one transition of one path between two snapshots. A
//! [`ChangeList`] collects every transition of a single path across a range
//! of snapshots, and the diff types bundle change lists with the snapshots
//! they were computed between.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::filesystem::File;
use super::newtypes::{HistoryName, MultiSnapshotId, SnapshotId};
use super::path;
use super::reference::FileReference;

/// Kind of transition a path went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Modified => write!(f, "Modified"),
            Self::Deleted => write!(f, "Deleted"),
        }
    }
}

/// One transition of one path
///
/// `from_version` is absent exactly for additions and `to_version` is absent
/// exactly for deletions. The constructors enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ChangeRecord", into = "ChangeRecord")]
pub struct Change {
    path: String,
    change_type: ChangeType,
    from_version: Option<FileReference>,
    to_version: Option<FileReference>,
}

impl Change {
    /// A file appeared
    #[must_use]
    pub fn added(to_version: FileReference) -> Self {
        Self {
            path: to_version.path().to_string(),
            change_type: ChangeType::Added,
            from_version: None,
            to_version: Some(to_version),
        }
    }

    /// A file disappeared
    #[must_use]
    pub fn deleted(from_version: FileReference) -> Self {
        Self {
            path: from_version.path().to_string(),
            change_type: ChangeType::Deleted,
            from_version: Some(from_version),
            to_version: None,
        }
    }

    /// A file changed in place
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidChange`] if the two versions have
    /// different paths
    pub fn modified(from_version: FileReference, to_version: FileReference) -> Result<Self, DomainError> {
        if !path::eq_ignore_case(from_version.path(), to_version.path()) {
            return Err(DomainError::InvalidChange(format!(
                "modification must keep the path: {} -> {}",
                from_version.path(),
                to_version.path()
            )));
        }
        Ok(Self {
            path: to_version.path().to_string(),
            change_type: ChangeType::Modified,
            from_version: Some(from_version),
            to_version: Some(to_version),
        })
    }

    /// Build a change from its parts, checking the version invariants
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidChange`] if the presence of the versions
    /// does not fit `change_type`
    pub fn new(
        change_type: ChangeType,
        from_version: Option<FileReference>,
        to_version: Option<FileReference>,
    ) -> Result<Self, DomainError> {
        match (change_type, from_version, to_version) {
            (ChangeType::Added, None, Some(to)) => Ok(Self::added(to)),
            (ChangeType::Deleted, Some(from), None) => Ok(Self::deleted(from)),
            (ChangeType::Modified, Some(from), Some(to)) => Self::modified(from, to),
            (change_type, from, to) => Err(DomainError::InvalidChange(format!(
                "{change_type} change with from_version present={} and to_version present={}",
                from.is_some(),
                to.is_some()
            ))),
        }
    }

    /// Classify the transition between two versions of a path
    ///
    /// Returns `None` when both sides are absent or the versions are equal.
    #[must_use]
    pub fn between(from: Option<&File>, to: Option<&File>) -> Option<Self> {
        match (from, to) {
            (None, None) => None,
            (None, Some(to)) => Some(Self::added(to.to_reference())),
            (Some(from), None) => Some(Self::deleted(from.to_reference())),
            (Some(from), Some(to)) if from.is_same_version(to) => None,
            (Some(from), Some(to)) => Some(Self {
                path: to.path().to_string(),
                change_type: ChangeType::Modified,
                from_version: Some(from.to_reference()),
                to_version: Some(to.to_reference()),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    #[must_use]
    pub fn from_version(&self) -> Option<&FileReference> {
        self.from_version.as_ref()
    }

    #[must_use]
    pub fn to_version(&self) -> Option<&FileReference> {
        self.to_version.as_ref()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.change_type, self.path)
    }
}

#[derive(Serialize, Deserialize)]
struct ChangeRecord {
    change_type: ChangeType,
    from_version: Option<FileReference>,
    to_version: Option<FileReference>,
}

impl TryFrom<ChangeRecord> for Change {
    type Error = DomainError;

    fn try_from(record: ChangeRecord) -> Result<Self, Self::Error> {
        Self::new(record.change_type, record.from_version, record.to_version)
    }
}

impl From<Change> for ChangeRecord {
    fn from(change: Change) -> Self {
        Self {
            change_type: change.change_type,
            from_version: change.from_version,
            to_version: change.to_version,
        }
    }
}

/// All changes of one path, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeList {
    path: String,
    changes: Vec<Change>,
}

impl ChangeList {
    /// Create a change list
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidChange`] if `changes` is empty or the
    /// changes do not all share one path (ignoring case)
    pub fn new(changes: Vec<Change>) -> Result<Self, DomainError> {
        let path = match changes.first() {
            Some(first) => first.path().to_string(),
            None => {
                return Err(DomainError::InvalidChange(
                    "a change list needs at least one change".to_string(),
                ))
            }
        };
        if let Some(stray) = changes
            .iter()
            .find(|change| !path::eq_ignore_case(change.path(), &path))
        {
            return Err(DomainError::InvalidChange(format!(
                "change for {} does not belong to change list for {path}",
                stray.path()
            )));
        }
        Ok(Self { path, changes })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    #[must_use]
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Version before the first change (`None` if the file was added)
    #[must_use]
    pub fn initial_version(&self) -> Option<&FileReference> {
        self.changes.first().and_then(Change::from_version)
    }

    /// Version after the last change (`None` if the file was deleted)
    #[must_use]
    pub fn current_version(&self) -> Option<&FileReference> {
        self.changes.last().and_then(Change::to_version)
    }
}

/// Changes of one history between two of its snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemDiff {
    pub history: HistoryName,
    /// `None` when diffing from the beginning of the history
    pub from_snapshot: Option<SnapshotId>,
    pub to_snapshot: SnapshotId,
    /// Net change per path between the two snapshots
    pub changes: Vec<Change>,
    /// Every intermediate change per path
    pub change_lists: Vec<ChangeList>,
}

/// Changes across all histories of a group between two multi-snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiFileSystemDiff {
    pub from_snapshot: Option<MultiSnapshotId>,
    pub to_snapshot: MultiSnapshotId,
    pub change_lists: Vec<ChangeList>,
}
