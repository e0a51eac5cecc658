//! Two-way synchronizer
//!
//! For every changed path the change lists of each participant are folded
//! into a [`ChangeGraph`] of versions. The graph's sinks are the versions the
//! participant currently has; comparing them across the two sides decides
//! between an action for the side that is behind, nothing, or a conflict.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use treesync_core::domain::{
    path, ChangeList, FileReference, FilterConfiguration, MultiFileSystemDiff, PathFilter,
};

use crate::action::{SyncAction, SyncParticipant};
use crate::action_set::SynchronizerResult;
use crate::apply::{MetadataComparer, VersionComparer};
use crate::change_graph::ChangeGraph;
use crate::conflict::SyncConflict;
use crate::error::SyncError;

/// Changes of one participant since the last synchronization
#[derive(Debug, Clone)]
pub struct ParticipantChanges<'a> {
    change_lists: &'a [ChangeList],
    filter: PathFilter,
}

impl<'a> ParticipantChanges<'a> {
    pub fn new(change_lists: &'a [ChangeList]) -> Self {
        Self {
            change_lists,
            filter: PathFilter::allow_all(),
        }
    }

    pub fn from_diff(diff: &'a MultiFileSystemDiff) -> Self {
        Self::new(&diff.change_lists)
    }

    /// Only paths accepted by `filter` take part in the synchronization
    #[must_use]
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// # Errors
    /// [`SyncError::Domain`] if a pattern of `config` is invalid
    pub fn with_filter_configuration(self, config: &FilterConfiguration) -> Result<Self, SyncError> {
        Ok(self.with_filter(config.compile()?))
    }
}

/// Where one participant's file ended up
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    /// Back at the version it started from
    Unchanged,
    /// Moved from `initial` to `current`; `None` means absent
    Changed {
        initial: Option<FileReference>,
        current: Option<FileReference>,
    },
    /// Several distinct current versions
    Diverged(Vec<Option<FileReference>>),
}

/// Computes the actions that bring two participants up to date
#[derive(Debug, Clone)]
pub struct Synchronizer {
    comparer: Arc<dyn VersionComparer>,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::with_comparer(Arc::new(MetadataComparer))
    }

    /// Synchronizer that decides version identity with `comparer`
    pub fn with_comparer(comparer: Arc<dyn VersionComparer>) -> Self {
        Self { comparer }
    }

    /// Compares both sides path by path
    ///
    /// Actions are emitted in path order. A path changed on one side only
    /// gets an action targeting the other side; identical results on both
    /// sides need nothing; anything else is a conflict.
    pub fn synchronize(
        &self,
        left: ParticipantChanges<'_>,
        right: ParticipantChanges<'_>,
    ) -> Result<SynchronizerResult, SyncError> {
        let left_lists = group_by_path(&left);
        let right_lists = group_by_path(&right);

        let mut keys: Vec<&String> = left_lists.keys().chain(right_lists.keys()).collect();
        keys.sort();
        keys.dedup();

        let mut result = SynchronizerResult::new(Arc::clone(&self.comparer));
        for key in keys {
            let left_outcome = left_lists
                .get(key)
                .map(|l| outcome(self.comparer.as_ref(), l))
                .transpose()?;
            let right_outcome = right_lists
                .get(key)
                .map(|l| outcome(self.comparer.as_ref(), l))
                .transpose()?;
            let file_path = left_lists
                .get(key)
                .or_else(|| right_lists.get(key))
                .and_then(|lists| lists.first())
                .map_or(key.as_str(), |list| list.path());

            resolve(
                self.comparer.as_ref(),
                &mut result,
                file_path,
                left_outcome.unwrap_or(Outcome::Unchanged),
                right_outcome.unwrap_or(Outcome::Unchanged),
            )?;
        }

        info!(
            actions = result.actions().len(),
            conflicts = result.conflicts().len(),
            "Synchronization computed"
        );
        Ok(result)
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Change lists of one side grouped by case-insensitive path, filter applied
fn group_by_path<'a>(changes: &ParticipantChanges<'a>) -> BTreeMap<String, Vec<&'a ChangeList>> {
    let mut grouped: BTreeMap<String, Vec<&'a ChangeList>> = BTreeMap::new();
    for list in changes.change_lists {
        if changes.filter.matches(list.path()) {
            grouped.entry(path::key(list.path())).or_default().push(list);
        }
    }
    grouped
}

fn same_version(
    comparer: &dyn VersionComparer,
    a: &Option<FileReference>,
    b: &Option<FileReference>,
) -> bool {
    comparer.is_same_reference(a.as_ref(), b.as_ref())
}

/// Folds all changes of one path on one side into a version graph
fn outcome(comparer: &dyn VersionComparer, lists: &[&ChangeList]) -> Result<Outcome, SyncError> {
    let mut graph = ChangeGraph::new(|a: &Option<FileReference>, b: &Option<FileReference>| {
        same_version(comparer, a, b)
    });
    let mut initial: Option<Option<FileReference>> = None;

    for list in lists {
        for change in list.changes() {
            let from = change.from_version().cloned();
            let to = change.to_version().cloned();
            if initial.is_none() {
                initial = Some(from.clone());
            }
            if !graph.contains(&from) {
                graph.add_node(from.clone());
            }
            graph.add_edge(&from, to)?;
        }
    }

    let Some(initial) = initial else {
        return Ok(Outcome::Unchanged);
    };

    let mut current: Vec<Option<FileReference>> = Vec::new();
    for sink in graph.sinks() {
        if !current.iter().any(|v| same_version(comparer, v, sink.value())) {
            current.push(sink.value().clone());
        }
    }

    match current.len() {
        0 => Ok(Outcome::Unchanged),
        1 => {
            let current = current.remove(0);
            if same_version(comparer, &initial, &current) {
                Ok(Outcome::Unchanged)
            } else {
                Ok(Outcome::Changed { initial, current })
            }
        }
        _ => Ok(Outcome::Diverged(current)),
    }
}

/// Action that moves `target` from `initial` to `current`
fn catch_up(
    target: SyncParticipant,
    initial: Option<FileReference>,
    current: Option<FileReference>,
) -> Result<Option<SyncAction>, SyncError> {
    Ok(match (initial, current) {
        (None, Some(new_file)) => Some(SyncAction::add_file(target, new_file)),
        (Some(removed), None) => Some(SyncAction::remove_file(target, removed)),
        (Some(old), Some(new)) => Some(SyncAction::replace_file(target, old, new)?),
        (None, None) => None,
    })
}

fn resolve(
    comparer: &dyn VersionComparer,
    result: &mut SynchronizerResult,
    file_path: &str,
    left: Outcome,
    right: Outcome,
) -> Result<(), SyncError> {
    match (left, right) {
        (Outcome::Unchanged, Outcome::Unchanged) => {}

        (Outcome::Diverged(mut versions), other) | (other, Outcome::Diverged(mut versions)) => {
            match other {
                Outcome::Changed { current, .. } => versions.push(current),
                Outcome::Diverged(more) => versions.extend(more),
                Outcome::Unchanged => {}
            }
            info!(path = %file_path, versions = versions.len(), "Multiple version conflict");
            result.add_conflict(SyncConflict::multiple_version(file_path, versions));
        }

        (Outcome::Changed { initial, current }, Outcome::Unchanged) => {
            if let Some(action) = catch_up(SyncParticipant::Right, initial, current)? {
                debug!(action = %action, "Emitting sync action");
                result.add_action(action);
            }
        }

        (Outcome::Unchanged, Outcome::Changed { initial, current }) => {
            if let Some(action) = catch_up(SyncParticipant::Left, initial, current)? {
                debug!(action = %action, "Emitting sync action");
                result.add_action(action);
            }
        }

        (
            Outcome::Changed {
                initial: left_initial,
                current: left_current,
            },
            Outcome::Changed {
                initial: right_initial,
                current: right_current,
            },
        ) => {
            if same_version(comparer, &left_current, &right_current) {
                debug!(path = %file_path, "Both sides converged on the same version");
                return Ok(());
            }
            match (left_current, right_current) {
                (Some(modified), None) => {
                    let deleted = right_initial.unwrap_or_else(|| modified.clone());
                    info!(path = %file_path, "Modification/deletion conflict");
                    result.add_conflict(SyncConflict::modification_deletion(
                        file_path, modified, deleted,
                    ));
                }
                (None, Some(modified)) => {
                    let deleted = left_initial.unwrap_or_else(|| modified.clone());
                    info!(path = %file_path, "Modification/deletion conflict");
                    result.add_conflict(SyncConflict::modification_deletion(
                        file_path, modified, deleted,
                    ));
                }
                (left_current, right_current) => {
                    info!(path = %file_path, "Multiple version conflict");
                    result.add_conflict(SyncConflict::multiple_version(
                        file_path,
                        vec![left_current, right_current],
                    ));
                }
            }
        }
    }
    Ok(())
}
