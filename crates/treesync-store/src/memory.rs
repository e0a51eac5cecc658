//! In-memory implementation of the store ports
//!
//! Snapshot ids are sequence numbers shared by all histories, the way a
//! relational backend would hand out row ids. Nothing is persisted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use treesync_core::domain::{
    ConflictInfo, Directory, FilterConfiguration, HistoryName, MultiHistorySnapshot, MultiSnapshotId, Snapshot,
    SnapshotId, SyncPoint, SyncPointId,
};
use treesync_core::ports::{
    ConflictError, IConflictRepository, IMultiSnapshotStore, ISnapshotStore, ISyncPointRepository,
    StoreError,
};

use crate::conflicts::{self, ConflictMap};

/// Store keeping every snapshot in memory
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    histories: DashMap<HistoryName, Vec<Snapshot>>,
    next_snapshot_id: AtomicU64,
    multi_snapshots: RwLock<Vec<MultiHistorySnapshot>>,
    sync_points: RwLock<Vec<SyncPoint>>,
    conflicts: RwLock<ConflictMap>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning a shared handle
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn next_id(&self) -> Result<SnapshotId, StoreError> {
        let id = self.next_snapshot_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SnapshotId::new(id.to_string())?)
    }

    fn read_conflicts(&self) -> Result<RwLockReadGuard<'_, ConflictMap>, ConflictError> {
        self.conflicts
            .read()
            .map_err(|_| ConflictError::Storage(anyhow::anyhow!("store lock poisoned")))
    }

    fn write_conflicts(&self) -> Result<RwLockWriteGuard<'_, ConflictMap>, ConflictError> {
        self.conflicts
            .write()
            .map_err(|_| ConflictError::Storage(anyhow::anyhow!("store lock poisoned")))
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Storage(anyhow::anyhow!("store lock poisoned")))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Storage(anyhow::anyhow!("store lock poisoned")))
}

impl ISnapshotStore for InMemorySnapshotStore {
    fn create_history(&self, history: &HistoryName) -> Result<(), StoreError> {
        match self.histories.entry(history.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateHistory(history.clone())),
            Entry::Vacant(slot) => {
                slot.insert(Vec::new());
                info!(history = %history, "History created");
                Ok(())
            }
        }
    }

    fn history_names(&self) -> Result<Vec<HistoryName>, StoreError> {
        let mut names: Vec<HistoryName> = self.histories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    fn create_snapshot(&self, history: &HistoryName, root: Directory) -> Result<Snapshot, StoreError> {
        let mut entry = self
            .histories
            .get_mut(history)
            .ok_or_else(|| StoreError::HistoryNotFound(history.clone()))?;
        let snapshot = Snapshot::new(self.next_id()?, entry.key().clone(), Utc::now(), root);
        entry.value_mut().push(snapshot.clone());
        debug!(history = %history, snapshot = %snapshot.id(), "Snapshot created");
        Ok(snapshot)
    }

    fn get_snapshot(&self, history: &HistoryName, id: &SnapshotId) -> Result<Snapshot, StoreError> {
        let entry = self
            .histories
            .get(history)
            .ok_or_else(|| StoreError::HistoryNotFound(history.clone()))?;
        entry
            .iter()
            .find(|s| s.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::SnapshotNotFound {
                history: history.clone(),
                id: id.clone(),
            })
    }

    fn list_snapshots(&self, history: &HistoryName) -> Result<Vec<Snapshot>, StoreError> {
        self.histories
            .get(history)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::HistoryNotFound(history.clone()))
    }
}

impl IMultiSnapshotStore for InMemorySnapshotStore {
    fn create_multi_snapshot(&self) -> Result<MultiHistorySnapshot, StoreError> {
        let mut multi_snapshots = write(&self.multi_snapshots)?;
        let snapshots: BTreeMap<HistoryName, SnapshotId> = self
            .histories
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .last()
                    .map(|latest| (entry.key().clone(), latest.id().clone()))
            })
            .collect();

        let id = MultiSnapshotId::new((multi_snapshots.len() + 1).to_string())?;
        let multi = MultiHistorySnapshot::new(id, Utc::now(), snapshots);
        multi_snapshots.push(multi.clone());
        info!(
            id = %multi.id(),
            histories = multi.history_names().count(),
            "Multi-history snapshot created"
        );
        Ok(multi)
    }

    fn get_multi_snapshot(&self, id: &MultiSnapshotId) -> Result<MultiHistorySnapshot, StoreError> {
        read(&self.multi_snapshots)?
            .iter()
            .find(|m| m.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::MultiSnapshotNotFound(id.clone()))
    }

    fn list_multi_snapshots(&self) -> Result<Vec<MultiHistorySnapshot>, StoreError> {
        Ok(read(&self.multi_snapshots)?.clone())
    }
}

impl ISyncPointRepository for InMemorySnapshotStore {
    fn create_sync_point(
        &self,
        from_snapshot: Option<&MultiSnapshotId>,
        to_snapshot: &MultiSnapshotId,
        filters: BTreeMap<HistoryName, FilterConfiguration>,
    ) -> Result<SyncPoint, StoreError> {
        for id in from_snapshot.into_iter().chain(std::iter::once(to_snapshot)) {
            self.get_multi_snapshot(id)?;
        }

        let mut sync_points = write(&self.sync_points)?;
        let id = SyncPointId::new(sync_points.len() as i64 + 1);
        let mut point = SyncPoint::new(id, to_snapshot.clone()).with_filters(filters);
        if let Some(from) = from_snapshot {
            point = point.with_from_snapshot(from.clone());
        }
        sync_points.push(point.clone());
        debug!(id = %id, to = %to_snapshot, "Sync point recorded");
        Ok(point)
    }

    fn get_sync_point(&self, id: SyncPointId) -> Result<SyncPoint, StoreError> {
        read(&self.sync_points)?
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or(StoreError::SyncPointNotFound(id))
    }

    fn list_sync_points(&self) -> Result<Vec<SyncPoint>, StoreError> {
        Ok(read(&self.sync_points)?.clone())
    }
}

impl IConflictRepository for InMemorySnapshotStore {
    fn conflicts(&self) -> Result<Vec<ConflictInfo>, ConflictError> {
        Ok(self.read_conflicts()?.values().cloned().collect())
    }

    fn get_conflict(&self, file_path: &str) -> Result<ConflictInfo, ConflictError> {
        conflicts::get(&*self.read_conflicts()?, file_path)
    }

    fn conflict_exists(&self, file_path: &str) -> Result<bool, ConflictError> {
        let key = conflicts::key_for(file_path)?;
        Ok(self.read_conflicts()?.contains_key(&key))
    }

    fn add_conflicts(&self, batch: &[ConflictInfo]) -> Result<(), ConflictError> {
        conflicts::add_all(&mut *self.write_conflicts()?, batch)?;
        debug!(count = batch.len(), "Conflicts recorded");
        Ok(())
    }

    fn remove_conflicts(&self, batch: &[ConflictInfo]) -> Result<(), ConflictError> {
        conflicts::remove_all(&mut *self.write_conflicts()?, batch)?;
        debug!(count = batch.len(), "Conflicts removed");
        Ok(())
    }
}
