//! Persisted record of an unresolved conflict
//!
//! A [`ConflictInfo`] marks a path the synchronizer could not reconcile,
//! together with the multi-snapshot that was current when the conflict was
//! found. Records are keyed by path, ignoring case.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::MultiSnapshotId;
use super::path;

/// An unresolved conflict on one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConflictInfoRecord", into = "ConflictInfoRecord")]
pub struct ConflictInfo {
    file_path: String,
    snapshot_id: Option<MultiSnapshotId>,
}

impl ConflictInfo {
    /// # Errors
    /// [`DomainError::InvalidPath`] if `file_path` is not a valid relative path
    pub fn new(
        file_path: impl Into<String>,
        snapshot_id: Option<MultiSnapshotId>,
    ) -> Result<Self, DomainError> {
        let file_path = file_path.into();
        path::validate_path(&file_path)?;
        Ok(Self {
            file_path,
            snapshot_id,
        })
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Multi-snapshot current when the conflict was recorded
    #[must_use]
    pub fn snapshot_id(&self) -> Option<&MultiSnapshotId> {
        self.snapshot_id.as_ref()
    }

    /// Case-insensitive key the record is stored under
    #[must_use]
    pub fn key(&self) -> String {
        path::key(&self.file_path)
    }
}

#[derive(Serialize, Deserialize)]
struct ConflictInfoRecord {
    file_path: String,
    #[serde(default)]
    snapshot_id: Option<MultiSnapshotId>,
}

impl TryFrom<ConflictInfoRecord> for ConflictInfo {
    type Error = DomainError;

    fn try_from(record: ConflictInfoRecord) -> Result<Self, Self::Error> {
        Self::new(record.file_path, record.snapshot_id)
    }
}

impl From<ConflictInfo> for ConflictInfoRecord {
    fn from(info: ConflictInfo) -> Self {
        Self {
            file_path: info.file_path,
            snapshot_id: info.snapshot_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_path() {
        assert!(ConflictInfo::new("dir/file1", None).is_ok());
        assert!(matches!(
            ConflictInfo::new("", None),
            Err(DomainError::InvalidPath(_))
        ));
        assert!(ConflictInfo::new("/abs", None).is_err());
        assert!(ConflictInfo::new("a//b", None).is_err());
    }

    #[test]
    fn test_key_ignores_case() {
        let upper = ConflictInfo::new("SOME/File", None).unwrap();
        let lower = ConflictInfo::new("some/file", None).unwrap();
        assert_eq!(upper.key(), lower.key());
        assert_eq!(upper.file_path(), "SOME/File");
    }

    #[test]
    fn test_serde_validates_path() {
        let snapshot = MultiSnapshotId::new("7").unwrap();
        let info = ConflictInfo::new("a.txt", Some(snapshot)).unwrap();
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(serde_json::from_str::<ConflictInfo>(&json).unwrap(), info);

        let bad: Result<ConflictInfo, _> = serde_json::from_str(r#"{"file_path":"/x"}"#);
        assert!(bad.is_err());
    }
}
