//! Snapshots of directory trees
//!
//! A [`Snapshot`] is an immutable capture of one history's tree at one point
//! in time. A [`MultiHistorySnapshot`] ties together one snapshot per history
//! so a group of sync folders can be addressed by a single id.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filesystem::Directory;
use super::newtypes::{HistoryName, MultiSnapshotId, SnapshotId};

/// Immutable capture of a history's tree
///
/// The root is shared behind an [`Arc`]; cloning a snapshot never copies the
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    id: SnapshotId,
    history: HistoryName,
    creation_time: DateTime<Utc>,
    root: Arc<Directory>,
}

impl Snapshot {
    pub fn new(
        id: SnapshotId,
        history: HistoryName,
        creation_time: DateTime<Utc>,
        root: impl Into<Arc<Directory>>,
    ) -> Self {
        Self {
            id,
            history,
            creation_time,
            root: root.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &SnapshotId {
        &self.id
    }

    /// History this snapshot belongs to
    #[must_use]
    pub fn history(&self) -> &HistoryName {
        &self.history
    }

    #[must_use]
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    #[must_use]
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Shared handle to the root, for callers that outlive the snapshot
    #[must_use]
    pub fn shared_root(&self) -> Arc<Directory> {
        Arc::clone(&self.root)
    }
}

/// A point in time across several histories
///
/// Maps each history name to the id of that history's snapshot. Histories
/// that did not exist yet when the multi-snapshot was taken are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiHistorySnapshot {
    id: MultiSnapshotId,
    creation_time: DateTime<Utc>,
    snapshots: BTreeMap<HistoryName, SnapshotId>,
}

impl MultiHistorySnapshot {
    pub fn new(
        id: MultiSnapshotId,
        creation_time: DateTime<Utc>,
        snapshots: BTreeMap<HistoryName, SnapshotId>,
    ) -> Self {
        Self {
            id,
            creation_time,
            snapshots,
        }
    }

    #[must_use]
    pub fn id(&self) -> &MultiSnapshotId {
        &self.id
    }

    #[must_use]
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    /// Histories captured by this multi-snapshot, ordered by name
    pub fn history_names(&self) -> impl Iterator<Item = &HistoryName> {
        self.snapshots.keys()
    }

    /// Snapshot id recorded for `history`, if the history was captured
    #[must_use]
    pub fn snapshot_id(&self, history: &HistoryName) -> Option<&SnapshotId> {
        self.snapshots.get(history)
    }

    /// All `(history, snapshot id)` pairs
    pub fn entries(&self) -> impl Iterator<Item = (&HistoryName, &SnapshotId)> {
        self.snapshots.iter()
    }

    /// Whether every history of `earlier` is still present here
    #[must_use]
    pub fn includes_histories_of(&self, earlier: &MultiHistorySnapshot) -> bool {
        earlier
            .snapshots
            .keys()
            .all(|name| self.snapshots.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::File;

    fn name(s: &str) -> HistoryName {
        HistoryName::new(s).unwrap()
    }

    fn sid(s: &str) -> SnapshotId {
        SnapshotId::new(s).unwrap()
    }

    #[test]
    fn test_snapshot_shares_root() {
        let root = Directory::root()
            .with_file(File::new("a.txt", Utc::now(), 10).unwrap())
            .unwrap();
        let snapshot = Snapshot::new(sid("1"), name("docs"), Utc::now(), root);
        let copy = snapshot.clone();
        assert!(Arc::ptr_eq(&snapshot.shared_root(), &copy.shared_root()));
        assert!(snapshot.root().file_exists("a.txt").unwrap());
    }

    #[test]
    fn test_multi_snapshot_lookup_is_case_insensitive() {
        let mut snapshots = BTreeMap::new();
        snapshots.insert(name("Docs"), sid("3"));
        let multi = MultiHistorySnapshot::new(
            MultiSnapshotId::new("1").unwrap(),
            Utc::now(),
            snapshots,
        );

        assert_eq!(multi.snapshot_id(&name("docs")), Some(&sid("3")));
        assert_eq!(multi.snapshot_id(&name("music")), None);
    }

    #[test]
    fn test_includes_histories_of() {
        let earlier = MultiHistorySnapshot::new(
            MultiSnapshotId::new("1").unwrap(),
            Utc::now(),
            [(name("a"), sid("1"))].into_iter().collect(),
        );
        let later = MultiHistorySnapshot::new(
            MultiSnapshotId::new("2").unwrap(),
            Utc::now(),
            [(name("a"), sid("2")), (name("b"), sid("1"))]
                .into_iter()
                .collect(),
        );
        assert!(later.includes_histories_of(&earlier));
        assert!(!earlier.includes_histories_of(&later));
    }

    #[test]
    fn test_multi_snapshot_serde_roundtrip() {
        let multi = MultiHistorySnapshot::new(
            MultiSnapshotId::new("5").unwrap(),
            Utc::now(),
            [(name("Docs"), sid("abc"))].into_iter().collect(),
        );
        let json = serde_json::to_string(&multi).unwrap();
        let parsed: MultiHistorySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, multi);
    }
}
