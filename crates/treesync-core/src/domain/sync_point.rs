//! Sync points
//!
//! A sync point records a completed synchronization: the multi-snapshot the
//! participants were brought up to, the one the synchronization started from,
//! and the filters that were in effect. The next run diffs from there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::FilterConfiguration;
use super::newtypes::{HistoryName, MultiSnapshotId, SyncPointId};

/// A completed synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPoint {
    id: SyncPointId,
    from_snapshot: Option<MultiSnapshotId>,
    to_snapshot: MultiSnapshotId,
    #[serde(default)]
    filter_configurations: BTreeMap<HistoryName, FilterConfiguration>,
}

impl SyncPoint {
    pub fn new(id: SyncPointId, to_snapshot: MultiSnapshotId) -> Self {
        Self {
            id,
            from_snapshot: None,
            to_snapshot,
            filter_configurations: BTreeMap::new(),
        }
    }

    /// Builder: set the multi-snapshot the synchronization started from
    #[must_use]
    pub fn with_from_snapshot(mut self, from: MultiSnapshotId) -> Self {
        self.from_snapshot = Some(from);
        self
    }

    /// Builder: record the filter used for `history`
    #[must_use]
    pub fn with_filter(mut self, history: HistoryName, filter: FilterConfiguration) -> Self {
        self.filter_configurations.insert(history, filter);
        self
    }

    /// Builder: replace all recorded filters
    #[must_use]
    pub fn with_filters(mut self, filters: BTreeMap<HistoryName, FilterConfiguration>) -> Self {
        self.filter_configurations = filters;
        self
    }

    #[must_use]
    pub fn id(&self) -> SyncPointId {
        self.id
    }

    #[must_use]
    pub fn from_snapshot(&self) -> Option<&MultiSnapshotId> {
        self.from_snapshot.as_ref()
    }

    #[must_use]
    pub fn to_snapshot(&self) -> &MultiSnapshotId {
        &self.to_snapshot
    }

    #[must_use]
    pub fn filter_configurations(&self) -> &BTreeMap<HistoryName, FilterConfiguration> {
        &self.filter_configurations
    }

    /// Filter recorded for `history`, or the empty filter
    #[must_use]
    pub fn filter_for(&self, history: &HistoryName) -> FilterConfiguration {
        self.filter_configurations
            .get(history)
            .cloned()
            .unwrap_or_default()
    }
}
