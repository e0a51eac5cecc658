//! Directory-backed implementation of the store ports
//!
//! All state lives in a single `state.json` inside the store directory.
//! Every write builds the new state on a copy, persists it with a
//! write-to-temp + rename and only then publishes it to readers, so a failed
//! write leaves both the file and the in-memory view unchanged.
//!
//! Snapshot ids are content hashes: SHA-256 over the history name, the
//! parent snapshot id, the creation time and the serialized tree, in the
//! spirit of commit ids in a version-control backend.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use treesync_core::domain::{
    ConflictInfo, Directory, FilterConfiguration, HistoryName, MultiHistorySnapshot, MultiSnapshotId, Snapshot,
    SnapshotId, SyncPoint, SyncPointId,
};
use treesync_core::ports::{
    ConflictError, IConflictRepository, IMultiSnapshotStore, ISnapshotStore, ISyncPointRepository,
    StoreError,
};

use crate::conflicts::{self, ConflictMap};

const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    histories: Vec<PersistedHistory>,
    #[serde(default)]
    multi_snapshots: Vec<MultiHistorySnapshot>,
    #[serde(default)]
    sync_points: Vec<SyncPoint>,
    #[serde(default)]
    conflicts: ConflictMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedHistory {
    name: HistoryName,
    snapshots: Vec<PersistedSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSnapshot {
    id: SnapshotId,
    parent: Option<SnapshotId>,
    creation_time: DateTime<Utc>,
    root: Arc<Directory>,
}

impl PersistedState {
    fn history(&self, name: &HistoryName) -> Result<&PersistedHistory, StoreError> {
        self.histories
            .iter()
            .find(|h| &h.name == name)
            .ok_or_else(|| StoreError::HistoryNotFound(name.clone()))
    }

    fn history_mut(&mut self, name: &HistoryName) -> Result<&mut PersistedHistory, StoreError> {
        self.histories
            .iter_mut()
            .find(|h| &h.name == name)
            .ok_or_else(|| StoreError::HistoryNotFound(name.clone()))
    }

    fn multi_snapshot(&self, id: &MultiSnapshotId) -> Result<&MultiHistorySnapshot, StoreError> {
        self.multi_snapshots
            .iter()
            .find(|m| m.id() == id)
            .ok_or_else(|| StoreError::MultiSnapshotNotFound(id.clone()))
    }
}

impl PersistedHistory {
    fn to_snapshot(&self, snapshot: &PersistedSnapshot) -> Snapshot {
        Snapshot::new(
            snapshot.id.clone(),
            self.name.clone(),
            snapshot.creation_time,
            Arc::clone(&snapshot.root),
        )
    }
}

/// Store persisting its state as JSON in a directory
#[derive(Debug)]
pub struct DirectorySnapshotStore {
    dir: PathBuf,
    state: RwLock<PersistedState>,
}

impl DirectorySnapshotStore {
    /// Opens the store in `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating store directory {}", dir.display()))?;

        let state_path = dir.join(STATE_FILE);
        let state = if state_path.exists() {
            let bytes = std::fs::read(&state_path)
                .with_context(|| format!("reading {}", state_path.display()))?;
            serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing {}", state_path.display()))?
        } else {
            PersistedState::default()
        };

        info!(dir = %dir.display(), histories = state.histories.len(), "Snapshot store opened");
        Ok(Self {
            dir,
            state: RwLock::new(state),
        })
    }

    /// Returns the default store directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("treesync")
            .join("store")
    }

    /// Directory the store lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PersistedState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Storage(anyhow::anyhow!("store lock poisoned")))
    }

    fn read_conflicts(&self) -> Result<RwLockReadGuard<'_, PersistedState>, ConflictError> {
        self.state
            .read()
            .map_err(|_| ConflictError::Storage(anyhow::anyhow!("store lock poisoned")))
    }

    fn commit<T>(
        &self,
        change: impl FnOnce(&mut PersistedState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.commit_with(change)
    }

    /// Applies `change` to a copy of the state, persists it, then publishes it
    fn commit_with<T, E: From<anyhow::Error>>(
        &self,
        change: impl FnOnce(&mut PersistedState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| E::from(anyhow::anyhow!("store lock poisoned")))?;
        let mut next = guard.clone();
        let result = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(result)
    }

    fn persist(&self, state: &PersistedState) -> anyhow::Result<()> {
        let target = self.dir.join(STATE_FILE);
        let tmp_path = self.dir.join(format!("{STATE_FILE}.tmp"));
        let bytes = serde_json::to_vec_pretty(state).context("serializing store state")?;

        debug!(?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, bytes)
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &target)
            .with_context(|| format!("renaming {} into place", tmp_path.display()))?;
        Ok(())
    }
}

fn content_id(
    history: &HistoryName,
    parent: Option<&SnapshotId>,
    creation_time: DateTime<Utc>,
    root: &Directory,
) -> Result<SnapshotId, StoreError> {
    let tree = serde_json::to_vec(root).context("serializing snapshot tree")?;
    let mut hasher = Sha256::new();
    hasher.update(history.key().as_bytes());
    hasher.update([0u8]);
    if let Some(parent) = parent {
        hasher.update(parent.as_str().as_bytes());
    }
    hasher.update([0u8]);
    hasher.update(creation_time.to_rfc3339().as_bytes());
    hasher.update([0u8]);
    hasher.update(&tree);
    Ok(SnapshotId::new(format!("{:x}", hasher.finalize()))?)
}

impl ISnapshotStore for DirectorySnapshotStore {
    #[instrument(skip(self, history), fields(history = %history))]
    fn create_history(&self, history: &HistoryName) -> Result<(), StoreError> {
        self.commit(|state| {
            if state.histories.iter().any(|h| &h.name == history) {
                return Err(StoreError::DuplicateHistory(history.clone()));
            }
            state.histories.push(PersistedHistory {
                name: history.clone(),
                snapshots: Vec::new(),
            });
            Ok(())
        })?;
        info!("History created");
        Ok(())
    }

    fn history_names(&self) -> Result<Vec<HistoryName>, StoreError> {
        let mut names: Vec<HistoryName> =
            self.read()?.histories.iter().map(|h| h.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self, history, root), fields(history = %history))]
    fn create_snapshot(&self, history: &HistoryName, root: Directory) -> Result<Snapshot, StoreError> {
        let snapshot = self.commit(|state| {
            let record = state.history_mut(history)?;
            let parent = record.snapshots.last().map(|s| s.id.clone());
            let creation_time = Utc::now();
            let id = content_id(&record.name, parent.as_ref(), creation_time, &root)?;
            let persisted = PersistedSnapshot {
                id,
                parent,
                creation_time,
                root: Arc::new(root),
            };
            let snapshot = record.to_snapshot(&persisted);
            record.snapshots.push(persisted);
            Ok(snapshot)
        })?;
        debug!(snapshot = %snapshot.id(), "Snapshot created");
        Ok(snapshot)
    }

    fn get_snapshot(&self, history: &HistoryName, id: &SnapshotId) -> Result<Snapshot, StoreError> {
        let state = self.read()?;
        let record = state.history(history)?;
        record
            .snapshots
            .iter()
            .find(|s| &s.id == id)
            .map(|s| record.to_snapshot(s))
            .ok_or_else(|| StoreError::SnapshotNotFound {
                history: history.clone(),
                id: id.clone(),
            })
    }

    fn list_snapshots(&self, history: &HistoryName) -> Result<Vec<Snapshot>, StoreError> {
        let state = self.read()?;
        let record = state.history(history)?;
        Ok(record
            .snapshots
            .iter()
            .map(|s| record.to_snapshot(s))
            .collect())
    }
}

impl IMultiSnapshotStore for DirectorySnapshotStore {
    #[instrument(skip(self))]
    fn create_multi_snapshot(&self) -> Result<MultiHistorySnapshot, StoreError> {
        let multi = self.commit(|state| {
            let snapshots: BTreeMap<HistoryName, SnapshotId> = state
                .histories
                .iter()
                .filter_map(|h| h.snapshots.last().map(|s| (h.name.clone(), s.id.clone())))
                .collect();
            let id = MultiSnapshotId::new((state.multi_snapshots.len() + 1).to_string())?;
            let multi = MultiHistorySnapshot::new(id, Utc::now(), snapshots);
            state.multi_snapshots.push(multi.clone());
            Ok(multi)
        })?;
        info!(id = %multi.id(), "Multi-history snapshot created");
        Ok(multi)
    }

    fn get_multi_snapshot(&self, id: &MultiSnapshotId) -> Result<MultiHistorySnapshot, StoreError> {
        self.read()?.multi_snapshot(id).cloned()
    }

    fn list_multi_snapshots(&self) -> Result<Vec<MultiHistorySnapshot>, StoreError> {
        Ok(self.read()?.multi_snapshots.clone())
    }
}

impl ISyncPointRepository for DirectorySnapshotStore {
    #[instrument(skip(self, filters))]
    fn create_sync_point(
        &self,
        from_snapshot: Option<&MultiSnapshotId>,
        to_snapshot: &MultiSnapshotId,
        filters: BTreeMap<HistoryName, FilterConfiguration>,
    ) -> Result<SyncPoint, StoreError> {
        self.commit(|state| {
            if let Some(from) = from_snapshot {
                state.multi_snapshot(from)?;
            }
            state.multi_snapshot(to_snapshot)?;

            let id = SyncPointId::new(state.sync_points.len() as i64 + 1);
            let mut point = SyncPoint::new(id, to_snapshot.clone()).with_filters(filters);
            if let Some(from) = from_snapshot {
                point = point.with_from_snapshot(from.clone());
            }
            state.sync_points.push(point.clone());
            Ok(point)
        })
    }

    fn get_sync_point(&self, id: SyncPointId) -> Result<SyncPoint, StoreError> {
        self.read()?
            .sync_points
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or(StoreError::SyncPointNotFound(id))
    }

    fn list_sync_points(&self) -> Result<Vec<SyncPoint>, StoreError> {
        Ok(self.read()?.sync_points.clone())
    }
}

impl IConflictRepository for DirectorySnapshotStore {
    fn conflicts(&self) -> Result<Vec<ConflictInfo>, ConflictError> {
        Ok(self.read_conflicts()?.conflicts.values().cloned().collect())
    }

    fn get_conflict(&self, file_path: &str) -> Result<ConflictInfo, ConflictError> {
        conflicts::get(&self.read_conflicts()?.conflicts, file_path)
    }

    fn conflict_exists(&self, file_path: &str) -> Result<bool, ConflictError> {
        let key = conflicts::key_for(file_path)?;
        Ok(self.read_conflicts()?.conflicts.contains_key(&key))
    }

    #[instrument(skip(self, batch), fields(count = batch.len()))]
    fn add_conflicts(&self, batch: &[ConflictInfo]) -> Result<(), ConflictError> {
        self.commit_with(|state| conflicts::add_all(&mut state.conflicts, batch))?;
        debug!("Conflicts recorded");
        Ok(())
    }

    #[instrument(skip(self, batch), fields(count = batch.len()))]
    fn remove_conflicts(&self, batch: &[ConflictInfo]) -> Result<(), ConflictError> {
        self.commit_with(|state| conflicts::remove_all(&mut state.conflicts, batch))?;
        debug!("Conflicts removed");
        Ok(())
    }
}
