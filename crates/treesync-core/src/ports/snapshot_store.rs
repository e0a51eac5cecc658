//! Snapshot store ports (driven/secondary ports)
//!
//! This module defines the interfaces for persisting histories, snapshots,
//! multi-history snapshots and sync points.
//!
//! ## Design Notes
//!
//! - The ports are synchronous: every operation is a local lookup or a single
//!   commit, and the diff engines built on them have no suspension points.
//! - Snapshot ids are opaque. Only the store knows how ids are ordered, so
//!   range queries ([`ISnapshotStore::snapshots_between`]) live here.
//! - Change detection between two versions is pushed down to the store via
//!   [`ISnapshotStore::get_changed_paths`]. The provided implementation
//!   compares the two trees; adapters with a cheaper source can override it.
//! - Adapter-specific failures are wrapped in [`StoreError::Storage`].

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::{
    Directory, DomainError, FilterConfiguration, HistoryName, MultiHistorySnapshot,
    MultiSnapshotId, Snapshot, SnapshotId, SyncPoint, SyncPointId,
};

/// Errors returned by the store ports
#[derive(Debug, Error)]
pub enum StoreError {
    /// No history with this name exists
    #[error("history not found: {0}")]
    HistoryNotFound(HistoryName),

    /// A history with this name (ignoring case) already exists
    #[error("history already exists: {0}")]
    DuplicateHistory(HistoryName),

    /// The id does not resolve to a snapshot of the history
    #[error("snapshot {id} not found in history {history}")]
    SnapshotNotFound { history: HistoryName, id: SnapshotId },

    /// The id does not resolve to a multi-history snapshot
    #[error("multi-history snapshot not found: {0}")]
    MultiSnapshotNotFound(MultiSnapshotId),

    /// The id does not resolve to a sync point
    #[error("sync point not found: {0}")]
    SyncPointNotFound(SyncPointId),

    /// `from` does not come before `to` in the history
    #[error("snapshot {from} does not precede {to} in history {history}")]
    InvalidRange {
        history: HistoryName,
        from: SnapshotId,
        to: SnapshotId,
    },

    /// Domain validation failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage backend error
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Port trait for per-history snapshot storage
///
/// ## Implementation Notes
///
/// - History names compare case-insensitively.
/// - [`create_snapshot`](Self::create_snapshot) must be atomic: readers see
///   either the previous latest snapshot or the new one.
/// - [`list_snapshots`](Self::list_snapshots) returns creation order.
pub trait ISnapshotStore: Send + Sync {
    /// Creates an empty history
    ///
    /// Fails with [`StoreError::DuplicateHistory`] if the name is taken.
    fn create_history(&self, history: &HistoryName) -> Result<(), StoreError>;

    /// Names of all histories, ordered by name
    fn history_names(&self) -> Result<Vec<HistoryName>, StoreError>;

    /// Commits `root` as the newest snapshot of `history`
    fn create_snapshot(&self, history: &HistoryName, root: Directory) -> Result<Snapshot, StoreError>;

    /// Resolves a snapshot id
    ///
    /// Fails with [`StoreError::SnapshotNotFound`] if absent.
    fn get_snapshot(&self, history: &HistoryName, id: &SnapshotId) -> Result<Snapshot, StoreError>;

    /// All snapshots of `history` in creation order
    fn list_snapshots(&self, history: &HistoryName) -> Result<Vec<Snapshot>, StoreError>;

    /// Newest snapshot of `history`, if any
    fn latest_snapshot(&self, history: &HistoryName) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.list_snapshots(history)?.pop())
    }

    /// Snapshots after `from` (exclusive) up to `to` (inclusive), oldest first
    ///
    /// With `from` absent the range starts at the first snapshot. Fails with
    /// [`StoreError::InvalidRange`] if `from` is not older than `to`.
    fn snapshots_between(
        &self,
        history: &HistoryName,
        from: Option<&SnapshotId>,
        to: &SnapshotId,
    ) -> Result<Vec<Snapshot>, StoreError> {
        let mut snapshots = self.list_snapshots(history)?;
        let not_found = |id: &SnapshotId| StoreError::SnapshotNotFound {
            history: history.clone(),
            id: id.clone(),
        };

        let end = snapshots
            .iter()
            .position(|s| s.id() == to)
            .ok_or_else(|| not_found(to))?;
        let start = match from {
            None => 0,
            Some(from_id) => {
                let idx = snapshots
                    .iter()
                    .position(|s| s.id() == from_id)
                    .ok_or_else(|| not_found(from_id))?;
                if idx >= end {
                    return Err(StoreError::InvalidRange {
                        history: history.clone(),
                        from: from_id.clone(),
                        to: to.clone(),
                    });
                }
                idx + 1
            }
        };

        snapshots.truncate(end + 1);
        Ok(snapshots.split_off(start))
    }

    /// Paths whose file differs between `from` and `to`
    ///
    /// With `from` absent every file of `to` is reported. Paths are unique
    /// (ignoring case) and ordered.
    fn get_changed_paths(
        &self,
        history: &HistoryName,
        from: Option<&SnapshotId>,
        to: &SnapshotId,
    ) -> Result<Vec<String>, StoreError> {
        let to_snapshot = self.get_snapshot(history, to)?;
        let from_root = match from {
            Some(id) => self.get_snapshot(history, id)?.shared_root(),
            None => std::sync::Arc::new(Directory::root()),
        };
        Ok(to_snapshot.root().changed_paths_since(&from_root))
    }
}

/// Port trait for multi-history snapshots
///
/// A multi-history snapshot captures the newest snapshot id of every
/// history. Since histories are never deleted, a later multi-snapshot always
/// contains every history name of an earlier one.
pub trait IMultiSnapshotStore: Send + Sync {
    /// Captures the newest snapshot of every non-empty history
    fn create_multi_snapshot(&self) -> Result<MultiHistorySnapshot, StoreError>;

    /// Resolves a multi-snapshot id
    ///
    /// Fails with [`StoreError::MultiSnapshotNotFound`] if absent.
    fn get_multi_snapshot(&self, id: &MultiSnapshotId) -> Result<MultiHistorySnapshot, StoreError>;

    /// All multi-snapshots in creation order
    fn list_multi_snapshots(&self) -> Result<Vec<MultiHistorySnapshot>, StoreError>;

    /// Newest multi-snapshot, if any
    fn latest_multi_snapshot(&self) -> Result<Option<MultiHistorySnapshot>, StoreError> {
        Ok(self.list_multi_snapshots()?.pop())
    }
}

/// Port trait for recording completed synchronizations
pub trait ISyncPointRepository: Send + Sync {
    /// Records a sync point; the store assigns the next id
    ///
    /// Fails with [`StoreError::MultiSnapshotNotFound`] if either
    /// multi-snapshot id is unknown.
    fn create_sync_point(
        &self,
        from_snapshot: Option<&MultiSnapshotId>,
        to_snapshot: &MultiSnapshotId,
        filters: BTreeMap<HistoryName, FilterConfiguration>,
    ) -> Result<SyncPoint, StoreError>;

    /// Resolves a sync point id
    fn get_sync_point(&self, id: SyncPointId) -> Result<SyncPoint, StoreError>;

    /// All sync points, oldest first
    fn list_sync_points(&self) -> Result<Vec<SyncPoint>, StoreError>;

    /// Most recent sync point, if any
    fn latest_sync_point(&self) -> Result<Option<SyncPoint>, StoreError> {
        Ok(self.list_sync_points()?.pop())
    }
}
