//! Applying sync actions to a working tree

use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;

use treesync_core::domain::{path, Directory, File, FileReference};

use crate::action::{SyncAction, SyncActionKind};
use crate::conflict::SyncConflict;
use crate::error::SyncError;

/// Decides whether an existing file is still the version an action recorded
pub trait VersionComparer: Send + Sync + fmt::Debug {
    fn is_same_version(&self, existing: &File, recorded: &FileReference) -> bool;

    /// Whether two recorded versions are the same; `None` is an absent file
    ///
    /// The default compares path (ignoring case), last write time and length.
    fn is_same_reference(&self, a: Option<&FileReference>, b: Option<&FileReference>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                path::eq_ignore_case(a.path(), b.path())
                    && a.last_write_time() == b.last_write_time()
                    && a.length() == b.length()
            }
            _ => false,
        }
    }
}

/// Compares path (ignoring case), last write time and length
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataComparer;

impl VersionComparer for MetadataComparer {
    fn is_same_version(&self, existing: &File, recorded: &FileReference) -> bool {
        recorded.matches(existing)
    }
}

/// Anything that can show up in an action list
#[derive(Debug, Clone, Copy)]
pub enum SyncEntry<'a> {
    Action(&'a SyncAction),
    Conflict(&'a SyncConflict),
}

/// Mutates a working tree one entry at a time
///
/// Directories created to hold an added file are remembered, and removed
/// again once a later removal leaves them empty, so an add followed by a
/// remove of the same file restores the original tree.
#[derive(Debug)]
pub struct ActionApplier<'a> {
    comparer: &'a dyn VersionComparer,
    created_directories: BTreeSet<String>,
}

impl<'a> ActionApplier<'a> {
    pub fn new(comparer: &'a dyn VersionComparer) -> Self {
        Self {
            comparer,
            created_directories: BTreeSet::new(),
        }
    }

    /// # Errors
    /// [`SyncError::InvalidOperation`] for conflicts, otherwise as
    /// [`apply_action`](Self::apply_action)
    pub fn apply(&mut self, root: &mut Directory, entry: SyncEntry<'_>) -> Result<(), SyncError> {
        match entry {
            SyncEntry::Action(action) => self.apply_action(root, action),
            SyncEntry::Conflict(conflict) => Err(SyncError::InvalidOperation(format!(
                "conflicts cannot be applied: {conflict}"
            ))),
        }
    }

    /// Either applies the action completely or fails without touching `root`
    ///
    /// # Errors
    /// [`SyncError::NotApplicable`] if the tree no longer satisfies the
    /// action's precondition
    pub fn apply_action(
        &mut self,
        root: &mut Directory,
        action: &SyncAction,
    ) -> Result<(), SyncError> {
        trace!(action = %action, "Applying sync action");
        match action.kind() {
            SyncActionKind::AddFile { new_file } => self.add_file(root, new_file),
            SyncActionKind::RemoveFile { removed_file } => self.remove_file(root, removed_file),
            SyncActionKind::ReplaceFile {
                old_version,
                new_version,
            } => {
                // Both versions share one path, so once the old file is gone
                // the only way the add can fail is an incomplete new version.
                let file = to_file(new_version)?;
                self.remove_file(root, old_version)?;
                self.insert_file(root, file, path::parent(new_version.path()))
            }
        }
    }

    fn add_file(&mut self, root: &mut Directory, new_file: &FileReference) -> Result<(), SyncError> {
        if root.file_exists(new_file.path())? {
            return Err(SyncError::NotApplicable(format!(
                "a file already exists at '{}'",
                new_file.path()
            )));
        }
        let file = to_file(new_file)?;
        self.insert_file(root, file, path::parent(new_file.path()))
    }

    fn insert_file(
        &mut self,
        root: &mut Directory,
        file: File,
        parent: &str,
    ) -> Result<(), SyncError> {
        let mut current = String::new();
        for segment in parent.split(path::SEPARATOR).filter(|s| !s.is_empty()) {
            current = path::join(&current, segment);
            if !root.directory_exists(&current)? {
                self.created_directories.insert(path::key(&current));
            }
        }

        root.ensure_directory_exists(parent)?.insert_file(file)?;
        Ok(())
    }

    fn remove_file(&mut self, root: &mut Directory, removed: &FileReference) -> Result<(), SyncError> {
        if !root.file_exists(removed.path())? {
            return Err(SyncError::NotApplicable(format!(
                "file '{}' was not found",
                removed.path()
            )));
        }

        let existing = root.get_file(removed.path())?;
        if !self.comparer.is_same_version(existing, removed) {
            return Err(SyncError::NotApplicable(format!(
                "existing file '{}' differs from the file to be removed",
                existing.path()
            )));
        }

        let parent = existing.parent_path().to_string();
        let name = existing.name().to_string();
        root.get_directory_mut(&parent)?.remove_file(&name)?;
        self.prune_created_directories(root, parent)
    }

    fn prune_created_directories(
        &mut self,
        root: &mut Directory,
        mut dir: String,
    ) -> Result<(), SyncError> {
        while !dir.is_empty()
            && self.created_directories.contains(&path::key(&dir))
            && root.get_directory(&dir)?.is_empty()
        {
            let parent = path::parent(&dir).to_string();
            root.get_directory_mut(&parent)?
                .remove_empty_directory(path::file_name(&dir))?;
            self.created_directories.remove(&path::key(&dir));
            dir = parent;
        }
        Ok(())
    }
}

fn to_file(reference: &FileReference) -> Result<File, SyncError> {
    if !reference.is_complete() {
        return Err(SyncError::NotApplicable(format!(
            "cannot add '{}' without its last write time and length",
            reference.path()
        )));
    }
    Ok(File::from_reference(reference)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::SyncParticipant;
    use chrono::{TimeZone, Utc};

    fn file(name: &str, length: u64) -> File {
        let time = Utc.with_ymd_and_hms(2023, 7, 4, 8, 30, 0).unwrap();
        File::new(name, time, length).unwrap()
    }

    fn tree() -> Directory {
        Directory::root()
            .with_directory(
                Directory::new("dir1")
                    .unwrap()
                    .with_file(file("file1", 10))
                    .unwrap(),
            )
            .unwrap()
    }

    fn reference(p: &str, length: u64) -> FileReference {
        let time = Utc.with_ymd_and_hms(2023, 7, 4, 8, 30, 0).unwrap();
        FileReference::new(p)
            .unwrap()
            .with_last_write_time(time)
            .with_length(length)
    }

    fn applier() -> ActionApplier<'static> {
        ActionApplier::new(&MetadataComparer)
    }

    #[test]
    fn test_add_creates_missing_directories() {
        let mut root = tree();
        let action = SyncAction::add_file(SyncParticipant::Left, reference("a/b/c.txt", 5));
        applier().apply_action(&mut root, &action).unwrap();

        assert!(root.directory_exists("a/b").unwrap());
        assert_eq!(root.get_file("a/b/c.txt").unwrap().length(), 5);
        assert_eq!(root.get_file("a/b/c.txt").unwrap().path(), "a/b/c.txt");
    }

    #[test]
    fn test_add_over_existing_file_is_not_applicable() {
        let mut root = tree();
        let action = SyncAction::add_file(SyncParticipant::Left, reference("DIR1/file1", 3));
        assert!(matches!(
            applier().apply_action(&mut root, &action),
            Err(SyncError::NotApplicable(_))
        ));
    }

    #[test]
    fn test_add_needs_a_complete_version() {
        let mut root = tree();
        let loose = FileReference::new("new.txt").unwrap().with_length(1);
        let action = SyncAction::add_file(SyncParticipant::Left, loose);
        assert!(matches!(
            applier().apply_action(&mut root, &action),
            Err(SyncError::NotApplicable(_))
        ));
        assert!(!root.file_exists("new.txt").unwrap());
    }

    #[test]
    fn test_remove_checks_version() {
        let mut root = tree();
        let stale = SyncAction::remove_file(SyncParticipant::Left, reference("dir1/file1", 99));
        assert!(matches!(
            applier().apply_action(&mut root, &stale),
            Err(SyncError::NotApplicable(_))
        ));

        let missing = SyncAction::remove_file(SyncParticipant::Left, reference("dir1/nope", 10));
        assert!(matches!(
            applier().apply_action(&mut root, &missing),
            Err(SyncError::NotApplicable(_))
        ));

        let current = SyncAction::remove_file(SyncParticipant::Left, reference("dir1/file1", 10));
        applier().apply_action(&mut root, &current).unwrap();
        assert!(!root.file_exists("dir1/file1").unwrap());
        assert!(root.directory_exists("dir1").unwrap());
    }

    #[test]
    fn test_replace_is_remove_then_add() {
        let mut root = tree();
        let action = SyncAction::replace_file(
            SyncParticipant::Right,
            reference("dir1/file1", 10),
            reference("dir1/file1", 42),
        )
        .unwrap();
        applier().apply_action(&mut root, &action).unwrap();
        assert_eq!(root.get_file("dir1/file1").unwrap().length(), 42);
    }

    #[test]
    fn test_conflicts_are_invalid_operations() {
        let mut root = tree();
        let conflict = SyncConflict::multiple_version("dir1/file1", vec![None]);
        assert!(matches!(
            applier().apply(&mut root, SyncEntry::Conflict(&conflict)),
            Err(SyncError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_failed_remove_leaves_tree_unchanged() {
        let mut root = tree();
        let absent = FileReference::new("ok.txt").unwrap();
        let action = SyncAction::remove_file(SyncParticipant::Left, absent);
        assert!(applier().apply_action(&mut root, &action).is_err());
        assert_eq!(root, tree());
    }

    #[test]
    fn test_failed_replace_leaves_tree_unchanged() {
        let mut root = tree();
        let incomplete = FileReference::new("dir1/file1").unwrap().with_length(42);
        let action =
            SyncAction::replace_file(SyncParticipant::Left, reference("dir1/file1", 10), incomplete)
                .unwrap();
        assert!(matches!(
            applier().apply_action(&mut root, &action),
            Err(SyncError::NotApplicable(_))
        ));
        assert_eq!(root, tree());
    }

    #[test]
    fn test_replace_with_stale_old_version_leaves_tree_unchanged() {
        let mut root = tree();
        let action = SyncAction::replace_file(
            SyncParticipant::Left,
            reference("dir1/file1", 11),
            reference("dir1/file1", 42),
        )
        .unwrap();
        assert!(applier().apply_action(&mut root, &action).is_err());
        assert_eq!(root, tree());
    }

    #[test]
    fn test_add_then_remove_nested_file_restores_tree() {
        let mut root = tree();
        let mut applier = applier();
        let new_file = reference("a/b/c.txt", 5);
        applier
            .apply_action(&mut root, &SyncAction::add_file(SyncParticipant::Left, new_file.clone()))
            .unwrap();
        applier
            .apply_action(&mut root, &SyncAction::remove_file(SyncParticipant::Left, new_file))
            .unwrap();
        assert_eq!(root, tree());
    }

    #[test]
    fn test_remove_keeps_directories_that_existed_before() {
        let mut root = tree();
        let mut applier = applier();
        applier
            .apply_action(
                &mut root,
                &SyncAction::remove_file(SyncParticipant::Left, reference("dir1/file1", 10)),
            )
            .unwrap();
        assert!(root.directory_exists("dir1").unwrap());

        applier
            .apply_action(
                &mut root,
                &SyncAction::add_file(SyncParticipant::Left, reference("dir1/sub/x", 1)),
            )
            .unwrap();
        applier
            .apply_action(
                &mut root,
                &SyncAction::remove_file(SyncParticipant::Left, reference("dir1/sub/x", 1)),
            )
            .unwrap();
        assert!(root.directory_exists("dir1").unwrap());
        assert!(!root.directory_exists("dir1/sub").unwrap());
    }
}
