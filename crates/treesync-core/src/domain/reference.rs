//! File references
//!
//! A [`FileReference`] identifies a file version by metadata only: its path
//! plus, optionally, the last write time and length. Absent fields act as
//! wildcards when matching, which allows lenient lookups such as "whatever is
//! at this path" or "this path with this length".

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::filesystem::File;
use super::path;

/// Metadata-based identity of a file version
///
/// Serialized with the field names `Path`, `LastWriteTime` and `Length`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use treesync_core::domain::{File, FileReference};
///
/// let time = Utc.with_ymd_and_hms(2015, 12, 27, 16, 2, 17).unwrap();
/// let file = File::new("file1", time, 23).unwrap();
///
/// let by_path = FileReference::new("FILE1").unwrap();
/// assert!(by_path.matches(&file));
///
/// let stale = FileReference::new("file1").unwrap().with_length(42);
/// assert!(!stale.matches(&file));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FileReferenceRecord", into = "FileReferenceRecord")]
pub struct FileReference {
    path: String,
    last_write_time: Option<DateTime<Utc>>,
    length: Option<u64>,
}

impl FileReference {
    /// Create a reference that matches any version at `path`
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPath`] if the path is malformed
    pub fn new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        path::validate_path(&path)?;
        Ok(Self {
            path,
            last_write_time: None,
            length: None,
        })
    }

    /// Require the given last write time
    #[must_use]
    pub fn with_last_write_time(mut self, time: DateTime<Utc>) -> Self {
        self.last_write_time = Some(time);
        self
    }

    /// Require the given length
    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Path of the referenced file, relative to the tree root
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Required last write time, if any
    #[must_use]
    pub fn last_write_time(&self) -> Option<DateTime<Utc>> {
        self.last_write_time
    }

    /// Required length, if any
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Whether both optional fields are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.last_write_time.is_some() && self.length.is_some()
    }

    /// Whether `file` is the referenced version
    ///
    /// The path compares case-insensitively; absent optional fields match
    /// anything.
    #[must_use]
    pub fn matches(&self, file: &File) -> bool {
        path::eq_ignore_case(&self.path, file.path()) && self.matches_version(file)
    }

    /// Like [`matches`](Self::matches) but ignores the path
    #[must_use]
    pub fn matches_version(&self, file: &File) -> bool {
        self.last_write_time
            .map_or(true, |time| time == file.last_write_time())
            && self.length.map_or(true, |length| length == file.length())
    }
}

impl From<&File> for FileReference {
    fn from(file: &File) -> Self {
        Self {
            path: file.path().to_string(),
            last_write_time: Some(file.last_write_time()),
            length: Some(file.length()),
        }
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if let Some(time) = self.last_write_time {
            write!(f, " @ {}", time.to_rfc3339())?;
        }
        if let Some(length) = self.length {
            write!(f, " ({length} bytes)")?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FileReferenceRecord {
    path: String,
    #[serde(default)]
    last_write_time: Option<DateTime<Utc>>,
    #[serde(default)]
    length: Option<u64>,
}

impl TryFrom<FileReferenceRecord> for FileReference {
    type Error = DomainError;

    fn try_from(record: FileReferenceRecord) -> Result<Self, Self::Error> {
        path::validate_path(&record.path)?;
        Ok(Self {
            path: record.path,
            last_write_time: record.last_write_time,
            length: record.length,
        })
    }
}

impl From<FileReference> for FileReferenceRecord {
    fn from(reference: FileReference) -> Self {
        Self {
            path: reference.path,
            last_write_time: reference.last_write_time,
            length: reference.length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 12, 27, 16, 2, 17).unwrap()
    }

    fn sample_file() -> File {
        File::new("file1", sample_time(), 23).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_path() {
        assert!(FileReference::new("").is_err());
        assert!(FileReference::new("/file1").is_err());
    }

    #[test]
    fn test_matches_matrix() {
        let file = sample_file();
        let other_time = sample_time() + chrono::Duration::seconds(1);

        let cases = [
            (FileReference::new("file1").unwrap(), true),
            (FileReference::new("FILE1").unwrap(), true),
            (FileReference::new("file2").unwrap(), false),
            (
                FileReference::new("file1").unwrap().with_length(23),
                true,
            ),
            (
                FileReference::new("file1").unwrap().with_length(24),
                false,
            ),
            (
                FileReference::new("file1")
                    .unwrap()
                    .with_last_write_time(sample_time()),
                true,
            ),
            (
                FileReference::new("file1")
                    .unwrap()
                    .with_last_write_time(other_time),
                false,
            ),
            (FileReference::from(&file), true),
        ];

        for (reference, expected) in cases {
            assert_eq!(reference.matches(&file), expected, "{reference}");
        }
    }

    #[test]
    fn test_from_file_is_complete() {
        let reference = FileReference::from(&sample_file());
        assert!(reference.is_complete());
        assert_eq!(reference.length(), Some(23));
        assert_eq!(reference.last_write_time(), Some(sample_time()));
    }

    #[test]
    fn test_serde_field_names() {
        let reference = FileReference::from(&sample_file());
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["Path"], "file1");
        assert_eq!(json["Length"], 23);
        assert!(json["LastWriteTime"].is_string());
    }

    #[test]
    fn test_deserialize_with_offset_and_fraction() {
        let json = r#"{"Path":"dir1/file1","LastWriteTime":"2015-12-27T17:02:17.8666998+01:00","Length":23}"#;
        let reference: FileReference = serde_json::from_str(json).unwrap();

        let expected = Utc.with_ymd_and_hms(2015, 12, 27, 16, 2, 17).unwrap()
            + chrono::Duration::nanoseconds(866_699_800);
        assert_eq!(reference.last_write_time(), Some(expected));

        let back: FileReference =
            serde_json::from_str(&serde_json::to_string(&reference).unwrap()).unwrap();
        assert_eq!(back, reference);
    }

    #[test]
    fn test_deserialize_rejects_invalid_path() {
        let result: Result<FileReference, _> = serde_json::from_str(r#"{"Path":"/abs"}"#);
        assert!(result.is_err());
    }
}
