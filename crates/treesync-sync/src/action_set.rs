//! Ordered collections of actions and conflicts

use std::sync::Arc;

use tracing::debug;

use treesync_core::domain::Directory;

use crate::action::{SyncAction, SyncParticipant};
use crate::apply::{ActionApplier, MetadataComparer, SyncEntry, VersionComparer};
use crate::conflict::SyncConflict;
use crate::error::SyncError;

/// Resolved actions plus unresolved conflicts, in insertion order
#[derive(Debug, Clone)]
pub struct SyncActionSet {
    actions: Vec<SyncAction>,
    conflicts: Vec<SyncConflict>,
    comparer: Arc<dyn VersionComparer>,
}

impl SyncActionSet {
    pub fn new() -> Self {
        Self::with_comparer(Arc::new(MetadataComparer))
    }

    pub fn with_comparer(comparer: Arc<dyn VersionComparer>) -> Self {
        Self {
            actions: Vec::new(),
            conflicts: Vec::new(),
            comparer,
        }
    }

    pub fn add_action(&mut self, action: SyncAction) {
        self.actions.push(action);
    }

    pub fn add_conflict(&mut self, conflict: SyncConflict) {
        self.conflicts.push(conflict);
    }

    pub fn actions(&self) -> &[SyncAction] {
        &self.actions
    }

    pub fn conflicts(&self) -> &[SyncConflict] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.conflicts.is_empty()
    }

    /// Actions first, then conflicts
    pub fn entries(&self) -> impl Iterator<Item = SyncEntry<'_>> {
        self.actions
            .iter()
            .map(SyncEntry::Action)
            .chain(self.conflicts.iter().map(SyncEntry::Conflict))
    }

    /// Applies every action to a copy of `directory`
    ///
    /// # Errors
    /// [`SyncError::InvalidOperation`] if the set holds conflicts;
    /// [`SyncError::NotApplicable`] if an action's precondition fails. The
    /// input tree is never modified.
    pub fn apply_to(&self, directory: &Directory) -> Result<Directory, SyncError> {
        apply_all(directory, &self.actions, &self.conflicts, self.comparer.as_ref())
    }
}

impl Default for SyncActionSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a synchronization: actions for both participants plus conflicts
#[derive(Debug, Clone)]
pub struct SynchronizerResult {
    actions: Vec<SyncAction>,
    conflicts: Vec<SyncConflict>,
    comparer: Arc<dyn VersionComparer>,
}

impl SynchronizerResult {
    pub fn new(comparer: Arc<dyn VersionComparer>) -> Self {
        Self {
            actions: Vec::new(),
            conflicts: Vec::new(),
            comparer,
        }
    }

    pub fn add_action(&mut self, action: SyncAction) {
        self.actions.push(action);
    }

    pub fn add_conflict(&mut self, conflict: SyncConflict) {
        self.conflicts.push(conflict);
    }

    pub fn actions(&self) -> &[SyncAction] {
        &self.actions
    }

    /// Actions targeting `target`, in emission order
    pub fn actions_for(&self, target: SyncParticipant) -> impl Iterator<Item = &SyncAction> {
        self.actions.iter().filter(move |a| a.target() == target)
    }

    pub fn conflicts(&self) -> &[SyncConflict] {
        &self.conflicts
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Applies the actions targeting `target` to a copy of `directory`
    ///
    /// # Errors
    /// Same as [`SyncActionSet::apply_to`]; conflicts block every target.
    pub fn apply_to(
        &self,
        directory: &Directory,
        target: SyncParticipant,
    ) -> Result<Directory, SyncError> {
        let actions: Vec<SyncAction> = self.actions_for(target).cloned().collect();
        apply_all(directory, &actions, &self.conflicts, self.comparer.as_ref())
    }

    /// The actions for `target` together with all conflicts
    pub fn to_action_set(&self, target: SyncParticipant) -> SyncActionSet {
        let mut set = SyncActionSet::with_comparer(Arc::clone(&self.comparer));
        for action in self.actions_for(target) {
            set.add_action(action.clone());
        }
        for conflict in &self.conflicts {
            set.add_conflict(conflict.clone());
        }
        set
    }
}

fn apply_all(
    directory: &Directory,
    actions: &[SyncAction],
    conflicts: &[SyncConflict],
    comparer: &dyn VersionComparer,
) -> Result<Directory, SyncError> {
    if !conflicts.is_empty() {
        return Err(SyncError::InvalidOperation(format!(
            "cannot apply actions while {} conflict(s) are unresolved",
            conflicts.len()
        )));
    }

    let mut applier = ActionApplier::new(comparer);
    let mut working = directory.clone();
    for action in actions {
        applier.apply(&mut working, SyncEntry::Action(action))?;
    }
    debug!(actions = actions.len(), "Applied sync actions");
    Ok(working)
}
