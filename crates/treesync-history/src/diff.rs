//! Diffs between two snapshots of one history
//!
//! The net changes between `from` and `to` come from the store's changed-path
//! query. The per-path change lists replay every intermediate snapshot so a
//! file that was added and modified in between shows both transitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use treesync_core::domain::{
    path, Change, ChangeList, Directory, DomainError, File, FileReference, FileSystemDiff,
    HistoryName, PathFilter, SnapshotId,
};
use treesync_core::ports::ISnapshotStore;

use crate::error::HistoryError;

/// Computes [`FileSystemDiff`]s for a single history
pub struct HistoryDiffEngine {
    store: Arc<dyn ISnapshotStore>,
}

impl HistoryDiffEngine {
    pub fn new(store: Arc<dyn ISnapshotStore>) -> Self {
        Self { store }
    }

    /// Changes of `history` from `from` (or its beginning) up to `to`
    ///
    /// Only paths accepted by `filter` are reported. Diffing a snapshot
    /// against itself yields an empty diff.
    ///
    /// # Errors
    /// [`HistoryError::Store`] if the history or either snapshot id does not
    /// resolve, or if `from` is newer than `to`.
    #[instrument(skip(self, history, filter), fields(history = %history, to = %to))]
    pub fn diff(
        &self,
        history: &HistoryName,
        from: Option<&SnapshotId>,
        to: &SnapshotId,
        filter: Option<&PathFilter>,
    ) -> Result<FileSystemDiff, HistoryError> {
        let to_snapshot = self.store.get_snapshot(history, to)?;
        let from_root = match from {
            Some(id) => self.store.get_snapshot(history, id)?.shared_root(),
            None => Arc::new(Directory::root()),
        };

        let accept = |p: &str| filter.map_or(true, |f| f.matches(p));

        if from == Some(to) {
            return Ok(FileSystemDiff {
                history: history.clone(),
                from_snapshot: from.cloned(),
                to_snapshot: to.clone(),
                changes: Vec::new(),
                change_lists: Vec::new(),
            });
        }

        let mut changes = Vec::new();
        for changed in self.store.get_changed_paths(history, from, to)? {
            if !accept(&changed) {
                continue;
            }
            let before = find_file(&from_root, &changed)?;
            let after = find_file(to_snapshot.root(), &changed)?;
            if let Some(change) = Change::between(before, after) {
                changes.push(change);
            }
        }

        let change_lists = self.change_lists(history, from, to, from_root, &accept)?;

        debug!(
            changes = changes.len(),
            change_lists = change_lists.len(),
            "Computed history diff"
        );

        Ok(FileSystemDiff {
            history: history.clone(),
            from_snapshot: from.cloned(),
            to_snapshot: to.clone(),
            changes,
            change_lists,
        })
    }

    /// Changes of `history` from its beginning up to its newest snapshot
    ///
    /// Returns `None` for a history without snapshots.
    pub fn diff_latest(
        &self,
        history: &HistoryName,
        filter: Option<&PathFilter>,
    ) -> Result<Option<FileSystemDiff>, HistoryError> {
        match self.store.latest_snapshot(history)? {
            Some(latest) => self.diff(history, None, latest.id(), filter).map(Some),
            None => Ok(None),
        }
    }

    /// Paths changed between `from` (or the beginning) and `to`
    pub fn changed_files(
        &self,
        history: &HistoryName,
        from: Option<&SnapshotId>,
        to: &SnapshotId,
    ) -> Result<Vec<String>, HistoryError> {
        if from == Some(to) {
            return Ok(Vec::new());
        }
        Ok(self.store.get_changed_paths(history, from, to)?)
    }

    /// Finds the file a reference points to, searching newest snapshots first
    ///
    /// # Errors
    /// [`HistoryError::VersionNotFound`] if no snapshot holds a matching file.
    pub fn resolve_reference(
        &self,
        history: &HistoryName,
        reference: &FileReference,
    ) -> Result<File, HistoryError> {
        for snapshot in self.store.list_snapshots(history)?.iter().rev() {
            match snapshot.root().get_file_by_reference(reference) {
                Ok(file) => {
                    debug!(
                        history = %history,
                        snapshot = %snapshot.id(),
                        path = %reference.path(),
                        "Resolved file reference"
                    );
                    return Ok(file.clone());
                }
                Err(DomainError::FileNotFound(_) | DomainError::DirectoryNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Err(HistoryError::VersionNotFound {
            history: history.clone(),
            reference: reference.clone(),
        })
    }

    /// Replays every snapshot in `(from, to]` and groups the hop changes by path
    fn change_lists(
        &self,
        history: &HistoryName,
        from: Option<&SnapshotId>,
        to: &SnapshotId,
        from_root: Arc<Directory>,
        accept: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<ChangeList>, HistoryError> {
        let mut by_path: BTreeMap<String, Vec<Change>> = BTreeMap::new();
        let mut previous = from_root;

        for snapshot in self.store.snapshots_between(history, from, to)? {
            let current = snapshot.shared_root();
            for changed in current.changed_paths_since(&previous) {
                if !accept(&changed) {
                    continue;
                }
                let before = find_file(&previous, &changed)?;
                let after = find_file(&current, &changed)?;
                if let Some(change) = Change::between(before, after) {
                    by_path.entry(path::key(&changed)).or_default().push(change);
                }
            }
            previous = current;
        }

        by_path
            .into_values()
            .map(|changes| ChangeList::new(changes).map_err(HistoryError::from))
            .collect()
    }
}

/// Looks up a file, mapping "not found" to `None`
pub(crate) fn find_file<'a>(
    root: &'a Directory,
    file_path: &str,
) -> Result<Option<&'a File>, DomainError> {
    match root.get_file(file_path) {
        Ok(file) => Ok(Some(file)),
        Err(DomainError::FileNotFound(_) | DomainError::DirectoryNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use treesync_core::domain::{ChangeType, FilterConfiguration, Snapshot};
    use treesync_store::InMemorySnapshotStore;

    fn file(name: &str, length: u64) -> File {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        File::new(name, time, length).unwrap()
    }

    struct Fixture {
        store: Arc<InMemorySnapshotStore>,
        engine: HistoryDiffEngine,
        history: HistoryName,
    }

    impl Fixture {
        fn new() -> Self {
            let store = InMemorySnapshotStore::shared();
            let history = HistoryName::new("docs").unwrap();
            store.create_history(&history).unwrap();
            let engine = HistoryDiffEngine::new(store.clone());
            Self {
                store,
                engine,
                history,
            }
        }

        fn commit(&self, root: Directory) -> Snapshot {
            self.store.create_snapshot(&self.history, root).unwrap()
        }
    }

    /// S0 empty, S1 adds a.txt (10 bytes), S2 grows it to 20 bytes
    fn scenario(fx: &Fixture) -> (Snapshot, Snapshot, Snapshot) {
        let s0 = fx.commit(Directory::root());
        let s1 = fx.commit(Directory::root().with_file(file("a.txt", 10)).unwrap());
        let s2 = fx.commit(Directory::root().with_file(file("a.txt", 20)).unwrap());
        (s0, s1, s2)
    }

    #[test]
    fn test_adjacent_modification() {
        let fx = Fixture::new();
        let (_, s1, s2) = scenario(&fx);

        let diff = fx
            .engine
            .diff(&fx.history, Some(s1.id()), s2.id(), None)
            .unwrap();

        assert_eq!(diff.changes.len(), 1);
        let change = &diff.changes[0];
        assert_eq!(change.path(), "a.txt");
        assert_eq!(change.change_type(), ChangeType::Modified);
        assert_eq!(change.from_version().unwrap().length(), Some(10));
        assert_eq!(change.to_version().unwrap().length(), Some(20));
    }

    #[test]
    fn test_adjacent_addition() {
        let fx = Fixture::new();
        let (s0, s1, _) = scenario(&fx);

        let diff = fx
            .engine
            .diff(&fx.history, Some(s0.id()), s1.id(), None)
            .unwrap();

        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type(), ChangeType::Added);
        assert_eq!(diff.changes[0].to_version().unwrap().length(), Some(10));
        assert!(diff.changes[0].from_version().is_none());
    }

    #[test]
    fn test_non_adjacent_diff_keeps_intermediate_steps() {
        let fx = Fixture::new();
        let (s0, _, s2) = scenario(&fx);

        let diff = fx
            .engine
            .diff(&fx.history, Some(s0.id()), s2.id(), None)
            .unwrap();

        // net change is a single addition of the 20 byte version
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type(), ChangeType::Added);
        assert_eq!(diff.changes[0].to_version().unwrap().length(), Some(20));

        assert_eq!(diff.change_lists.len(), 1);
        let list = &diff.change_lists[0];
        let kinds: Vec<_> = list.changes().iter().map(Change::change_type).collect();
        assert_eq!(kinds, vec![ChangeType::Added, ChangeType::Modified]);
        assert_eq!(list.current_version().unwrap().length(), Some(20));
    }

    #[test]
    fn test_diff_from_beginning_treats_everything_as_added() {
        let fx = Fixture::new();
        let (_, _, s2) = scenario(&fx);

        let diff = fx.engine.diff(&fx.history, None, s2.id(), None).unwrap();
        assert!(diff.from_snapshot.is_none());
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type(), ChangeType::Added);
        assert_eq!(diff.change_lists[0].changes().len(), 2);
    }

    #[test]
    fn test_diff_against_itself_is_empty() {
        let fx = Fixture::new();
        let (_, s1, _) = scenario(&fx);

        let diff = fx
            .engine
            .diff(&fx.history, Some(s1.id()), s1.id(), None)
            .unwrap();
        assert!(diff.changes.is_empty());
        assert!(diff.change_lists.is_empty());
    }

    #[test]
    fn test_deletion_is_reported() {
        let fx = Fixture::new();
        let s1 = fx.commit(Directory::root().with_file(file("a.txt", 10)).unwrap());
        let s2 = fx.commit(Directory::root());

        let diff = fx
            .engine
            .diff(&fx.history, Some(s1.id()), s2.id(), None)
            .unwrap();
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type(), ChangeType::Deleted);
        assert!(diff.changes[0].to_version().is_none());
    }

    #[test]
    fn test_filter_limits_reported_paths() {
        let fx = Fixture::new();
        let s1 = fx.commit(
            Directory::root()
                .with_file(file("keep.txt", 1))
                .unwrap()
                .with_file(file("skip.tmp", 1))
                .unwrap(),
        );
        let filter = FilterConfiguration::empty()
            .excluding("*.tmp")
            .compile()
            .unwrap();

        let diff = fx
            .engine
            .diff(&fx.history, None, s1.id(), Some(&filter))
            .unwrap();
        let paths: Vec<_> = diff.changes.iter().map(Change::path).collect();
        assert_eq!(paths, vec!["keep.txt"]);
        assert_eq!(diff.change_lists.len(), 1);
    }

    #[test]
    fn test_unknown_snapshot_fails() {
        let fx = Fixture::new();
        let (_, s1, _) = scenario(&fx);
        let missing = SnapshotId::new("missing").unwrap();

        let err = fx
            .engine
            .diff(&fx.history, Some(&missing), s1.id(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            HistoryError::Store(treesync_core::ports::StoreError::SnapshotNotFound { .. })
        ));
    }

    #[test]
    fn test_reversed_range_fails() {
        let fx = Fixture::new();
        let (_, s1, s2) = scenario(&fx);
        assert!(fx
            .engine
            .diff(&fx.history, Some(s2.id()), s1.id(), None)
            .is_err());
    }

    #[test]
    fn test_resolve_reference_searches_history() {
        let fx = Fixture::new();
        let (_, s1, _) = scenario(&fx);
        let old = s1.root().get_file("a.txt").unwrap().to_reference();

        let resolved = fx.engine.resolve_reference(&fx.history, &old).unwrap();
        assert_eq!(resolved.length(), 10);

        let loose = FileReference::new("A.TXT").unwrap();
        let newest = fx.engine.resolve_reference(&fx.history, &loose).unwrap();
        assert_eq!(newest.length(), 20);

        let unknown = FileReference::new("a.txt").unwrap().with_length(99);
        assert!(matches!(
            fx.engine.resolve_reference(&fx.history, &unknown),
            Err(HistoryError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_diff_latest_handles_empty_history() {
        let fx = Fixture::new();
        assert!(fx.engine.diff_latest(&fx.history, None).unwrap().is_none());

        scenario(&fx);
        let diff = fx.engine.diff_latest(&fx.history, None).unwrap().unwrap();
        assert_eq!(diff.changes.len(), 1);
    }
}
