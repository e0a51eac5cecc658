//! Diffs across all histories of a multi-history snapshot
//!
//! A multi-history snapshot only points into each history's own timeline,
//! so changes are computed per history and merged by path afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use treesync_core::domain::{
    path, Change, ChangeList, FileSystemDiff, MultiFileSystemDiff, MultiHistorySnapshot,
    MultiSnapshotId, PathFilter,
};
use treesync_core::ports::{IMultiSnapshotStore, ISnapshotStore};

use crate::diff::HistoryDiffEngine;
use crate::error::HistoryError;

/// Computes [`MultiFileSystemDiff`]s over every history of a snapshot
pub struct MultiHistoryDiffEngine {
    histories: HistoryDiffEngine,
    multi_store: Arc<dyn IMultiSnapshotStore>,
}

impl MultiHistoryDiffEngine {
    pub fn new(store: Arc<dyn ISnapshotStore>, multi_store: Arc<dyn IMultiSnapshotStore>) -> Self {
        Self {
            histories: HistoryDiffEngine::new(store),
            multi_store,
        }
    }

    /// Engine for the individual histories
    pub fn history_engine(&self) -> &HistoryDiffEngine {
        &self.histories
    }

    /// All changes of every history up to the multi-snapshot `to`
    pub fn changes(
        &self,
        to: &MultiSnapshotId,
        filter: Option<&PathFilter>,
    ) -> Result<MultiFileSystemDiff, HistoryError> {
        let to_snapshot = self.multi_store.get_multi_snapshot(to)?;

        let mut diffs = Vec::new();
        for (history, snapshot_id) in to_snapshot.entries() {
            diffs.push(self.histories.diff(history, None, snapshot_id, filter)?);
        }

        Ok(MultiFileSystemDiff {
            from_snapshot: None,
            to_snapshot: to.clone(),
            change_lists: combine(diffs)?,
        })
    }

    /// Changes of every history between the multi-snapshots `from` and `to`
    ///
    /// A history that did not exist at `from` contributes all of its changes
    /// up to `to`. `from` must be an ancestor of `to`; this is not checked,
    /// and a per-history `from` that is newer than `to` fails with
    /// [`StoreError::InvalidRange`](treesync_core::ports::StoreError::InvalidRange).
    pub fn changes_between(
        &self,
        from: &MultiSnapshotId,
        to: &MultiSnapshotId,
        filter: Option<&PathFilter>,
    ) -> Result<MultiFileSystemDiff, HistoryError> {
        let from_snapshot = self.multi_store.get_multi_snapshot(from)?;
        let to_snapshot = self.multi_store.get_multi_snapshot(to)?;
        warn_if_not_superset(&from_snapshot, &to_snapshot);

        let mut diffs = Vec::new();
        for (history, snapshot_id) in to_snapshot.entries() {
            let since = from_snapshot.snapshot_id(history);
            if since == Some(snapshot_id) {
                continue;
            }
            diffs.push(self.histories.diff(history, since, snapshot_id, filter)?);
        }

        Ok(MultiFileSystemDiff {
            from_snapshot: Some(from.clone()),
            to_snapshot: to.clone(),
            change_lists: combine(diffs)?,
        })
    }

    /// Paths changed in any history up to the multi-snapshot `to`
    pub fn changed_files(&self, to: &MultiSnapshotId) -> Result<Vec<String>, HistoryError> {
        let to_snapshot = self.multi_store.get_multi_snapshot(to)?;

        let mut paths = PathSet::default();
        for (history, snapshot_id) in to_snapshot.entries() {
            paths.extend(self.histories.changed_files(history, None, snapshot_id)?);
        }
        Ok(paths.into_paths())
    }

    /// Paths changed in any history between `from` and `to`
    pub fn changed_files_between(
        &self,
        from: &MultiSnapshotId,
        to: &MultiSnapshotId,
    ) -> Result<Vec<String>, HistoryError> {
        let from_snapshot = self.multi_store.get_multi_snapshot(from)?;
        let to_snapshot = self.multi_store.get_multi_snapshot(to)?;
        warn_if_not_superset(&from_snapshot, &to_snapshot);

        let mut paths = PathSet::default();
        for (history, snapshot_id) in to_snapshot.entries() {
            let since = from_snapshot.snapshot_id(history);
            paths.extend(self.histories.changed_files(history, since, snapshot_id)?);
        }
        Ok(paths.into_paths())
    }
}

fn warn_if_not_superset(from: &MultiHistorySnapshot, to: &MultiHistorySnapshot) {
    if !to.includes_histories_of(from) {
        tracing::warn!(
            from = %from.id(),
            to = %to.id(),
            "Target multi-snapshot is missing histories of the source"
        );
    }
}

/// Groups change lists of all histories by path and removes repeated changes
fn combine(diffs: Vec<FileSystemDiff>) -> Result<Vec<ChangeList>, HistoryError> {
    let mut by_path: BTreeMap<String, Vec<Change>> = BTreeMap::new();
    for diff in diffs {
        for list in diff.change_lists {
            let merged = by_path.entry(path::key(list.path())).or_default();
            for change in list.into_changes() {
                if !merged.contains(&change) {
                    merged.push(change);
                }
            }
        }
    }
    debug!(paths = by_path.len(), "Combined change lists across histories");

    by_path
        .into_values()
        .map(|changes| ChangeList::new(changes).map_err(HistoryError::from))
        .collect()
}

/// Case-insensitive set of paths; the first spelling seen wins
#[derive(Default)]
struct PathSet(BTreeMap<String, String>);

impl PathSet {
    fn extend(&mut self, paths: Vec<String>) {
        for p in paths {
            self.0.entry(path::key(&p)).or_insert(p);
        }
    }

    fn into_paths(self) -> Vec<String> {
        self.0.into_values().collect()
    }
}
