//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers and values.
//! Each newtype ensures data validity at construction time.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// UUID-based ID types
// ============================================================================

/// Identifier for sync actions
///
/// Serialized as a hyphenated UUID string, which is also the format of the
/// `id` field of persisted actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncActionId(Uuid);

impl SyncActionId {
    /// Create a new random SyncActionId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a SyncActionId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Create a nil (all zeros) SyncActionId
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SyncActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SyncActionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SyncActionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid SyncActionId: {e}")))
    }
}

impl From<Uuid> for SyncActionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// Integer ID types
// ============================================================================

/// Identifier for sync points (sequence number assigned by the store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncPointId(i64);

impl SyncPointId {
    /// Create a SyncPointId from an i64 value
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for SyncPointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SyncPointId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid SyncPointId: {e}")))
    }
}

impl From<i64> for SyncPointId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Store-assigned version identifiers
// ============================================================================

fn validate_opaque_id(kind: &str, id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::InvalidId(format!("{kind} cannot be empty")));
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DomainError::InvalidId(format!(
            "{kind} contains whitespace or control characters: {id:?}"
        )));
    }
    Ok(())
}

/// Identifier of a snapshot within one history
///
/// The value is whatever the store uses natively: a sequence number for the
/// in-memory store, a content hash for the directory store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Create a new SnapshotId
    ///
    /// # Errors
    /// Returns error if the id is empty or contains whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_opaque_id("SnapshotId", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SnapshotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SnapshotId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SnapshotId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SnapshotId> for String {
    fn from(id: SnapshotId) -> Self {
        id.0
    }
}

/// Identifier of a multi-history snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MultiSnapshotId(String);

impl MultiSnapshotId {
    /// Create a new MultiSnapshotId
    ///
    /// # Errors
    /// Returns error if the id is empty or contains whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_opaque_id("MultiSnapshotId", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MultiSnapshotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MultiSnapshotId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MultiSnapshotId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<MultiSnapshotId> for String {
    fn from(id: MultiSnapshotId) -> Self {
        id.0
    }
}

// ============================================================================
// History names
// ============================================================================

/// Name of a history (one tracked sync folder)
///
/// Names keep the casing they were created with but compare, hash and order
/// case-insensitively, so `"Docs"` and `"docs"` address the same history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HistoryName(String);

impl HistoryName {
    /// Create a new HistoryName
    ///
    /// # Errors
    /// Returns error if the name is blank, padded with whitespace or contains
    /// a path separator
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidName(
                "History name cannot be empty".to_string(),
            ));
        }
        if name.trim() != name {
            return Err(DomainError::InvalidName(format!(
                "History name has leading or trailing whitespace: {name:?}"
            )));
        }
        if name.contains(['/', '\\']) || name.chars().any(char::is_control) {
            return Err(DomainError::InvalidName(format!(
                "History name contains invalid characters: {name}"
            )));
        }
        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for comparisons and storage keys
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for HistoryName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HistoryName {}

impl Hash for HistoryName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for HistoryName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HistoryName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for HistoryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HistoryName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HistoryName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<HistoryName> for String {
    fn from(name: HistoryName) -> Self {
        name.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod sync_action_id_tests {
        use super::*;

        #[test]
        fn test_new_creates_unique_ids() {
            let id1 = SyncActionId::new();
            let id2 = SyncActionId::new();
            assert_ne!(id1, id2);
        }

        #[test]
        fn test_from_str() {
            let id: SyncActionId = "a7226a4d-9c1e-4d1b-8a8c-52b0d6b4e0f1".parse().unwrap();
            assert_eq!(id.to_string(), "a7226a4d-9c1e-4d1b-8a8c-52b0d6b4e0f1");
        }

        #[test]
        fn test_from_str_accepts_uppercase() {
            let id: SyncActionId = "A7226A4D-9C1E-4D1B-8A8C-52B0D6B4E0F1".parse().unwrap();
            assert_eq!(id.to_string(), "a7226a4d-9c1e-4d1b-8a8c-52b0d6b4e0f1");
        }

        #[test]
        fn test_from_str_invalid() {
            let result: Result<SyncActionId, _> = "not-a-uuid".parse();
            assert!(matches!(result, Err(DomainError::InvalidId(_))));
        }

        #[test]
        fn test_nil() {
            assert_eq!(
                SyncActionId::nil().to_string(),
                "00000000-0000-0000-0000-000000000000"
            );
        }
    }

    mod sync_point_id_tests {
        use super::*;

        #[test]
        fn test_roundtrip() {
            let id: SyncPointId = "42".parse().unwrap();
            assert_eq!(id.as_i64(), 42);
            assert_eq!(id, SyncPointId::from(42));
        }

        #[test]
        fn test_invalid() {
            assert!("abc".parse::<SyncPointId>().is_err());
        }
    }

    mod snapshot_id_tests {
        use super::*;

        #[test]
        fn test_new_valid() {
            let id = SnapshotId::new("3f2a9c").unwrap();
            assert_eq!(id.as_str(), "3f2a9c");
        }

        #[test]
        fn test_empty_fails() {
            assert!(SnapshotId::new("").is_err());
            assert!(MultiSnapshotId::new("").is_err());
        }

        #[test]
        fn test_whitespace_fails() {
            assert!(SnapshotId::new("a b").is_err());
        }

        #[test]
        fn test_serde_rejects_invalid() {
            let result: Result<SnapshotId, _> = serde_json::from_str("\"\"");
            assert!(result.is_err());

            let parsed: SnapshotId = serde_json::from_str("\"7\"").unwrap();
            assert_eq!(parsed.as_str(), "7");
        }
    }

    mod history_name_tests {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn test_case_insensitive_equality() {
            let a = HistoryName::new("Documents").unwrap();
            let b = HistoryName::new("documents").unwrap();
            assert_eq!(a, b);
            assert_eq!(a.cmp(&b), Ordering::Equal);

            let set: HashSet<_> = [a.clone(), b].into_iter().collect();
            assert_eq!(set.len(), 1);
            assert_eq!(a.to_string(), "Documents");
        }

        #[test]
        fn test_invalid_names() {
            assert!(HistoryName::new("").is_err());
            assert!(HistoryName::new("   ").is_err());
            assert!(HistoryName::new(" padded").is_err());
            assert!(HistoryName::new("a/b").is_err());
            assert!(HistoryName::new("a\\b").is_err());
        }
    }
}
