//! Directory trees
//!
//! A tree is a [`Directory`] owning its child directories and files. Every
//! item knows its path relative to the tree root; the parent link is that
//! path, not a pointer, so subtrees can be moved and cloned freely and their
//! paths are recomputed on insertion.
//!
//! Names are matched case-insensitively but keep the casing they were
//! created with.
//!
//! ## Lookups
//!
//! [`Directory::get_directory`], [`Directory::get_file`],
//! [`Directory::file_exists`] and [`Directory::directory_exists`] validate the
//! path before traversing. An invalid path is always an error; a missing item
//! is an error for the `get_*` methods and `false` for the `*_exists` methods.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::path;
use super::reference::FileReference;

// ============================================================================
// File
// ============================================================================

/// A file version in a tree: name, path, last write time and length
///
/// Content is never read; two files are the same version when path (ignoring
/// case), last write time and length are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    path: String,
    last_write_time: DateTime<Utc>,
    length: u64,
}

impl File {
    /// Create a detached file; its path is its name until it is inserted
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidName`] if the name is invalid
    pub fn new(
        name: impl Into<String>,
        last_write_time: DateTime<Utc>,
        length: u64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        path::validate_name(&name)?;
        Ok(Self {
            path: name.clone(),
            name,
            last_write_time,
            length,
        })
    }

    /// Create a file for a complete reference, named after its last segment
    ///
    /// # Errors
    /// Returns [`DomainError::ValidationFailed`] if the reference lacks a
    /// last write time or length
    pub fn from_reference(reference: &FileReference) -> Result<Self, DomainError> {
        match (reference.last_write_time(), reference.length()) {
            (Some(time), Some(length)) => Self::new(path::file_name(reference.path()), time, length),
            _ => Err(DomainError::ValidationFailed(format!(
                "reference is incomplete: {reference}"
            ))),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the tree root
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the containing directory (empty for top-level files)
    #[must_use]
    pub fn parent_path(&self) -> &str {
        path::parent(&self.path)
    }

    #[must_use]
    pub fn last_write_time(&self) -> DateTime<Utc> {
        self.last_write_time
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Whether `other` is the same version of the same file
    #[must_use]
    pub fn is_same_version(&self, other: &File) -> bool {
        path::eq_ignore_case(&self.path, &other.path)
            && self.last_write_time == other.last_write_time
            && self.length == other.length
    }

    /// Reference pinning this exact version
    #[must_use]
    pub fn to_reference(&self) -> FileReference {
        FileReference::from(self)
    }

    fn rebase(&mut self, parent_path: &str) {
        self.path = path::join(parent_path, &self.name);
    }
}

// ============================================================================
// Directory
// ============================================================================

/// Borrowed view of a named child, as returned by [`Directory::get`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSystemItem<'a> {
    File(&'a File),
    Directory(&'a Directory),
}

impl<'a> FileSystemItem<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            Self::File(file) => file.name(),
            Self::Directory(dir) => dir.name(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &'a str {
        match *self {
            Self::File(file) => file.path(),
            Self::Directory(dir) => dir.path(),
        }
    }
}

/// A directory owning child directories and files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DirectoryRecord", into = "DirectoryRecord")]
pub struct Directory {
    name: String,
    path: String,
    directories: BTreeMap<String, Directory>,
    files: BTreeMap<String, File>,
}

impl Directory {
    /// Create an empty, unnamed tree root
    #[must_use]
    pub fn root() -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            directories: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Create an empty named directory
    ///
    /// Until it is inserted into a parent it acts as the root of its own
    /// tree, so its path is empty.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidName`] if the name is invalid
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        path::validate_name(&name)?;
        Ok(Self {
            name,
            ..Self::root()
        })
    }

    /// Builder: add a child directory
    ///
    /// # Errors
    /// Returns [`DomainError::AlreadyExists`] if a directory with the same
    /// name (ignoring case) is already present
    pub fn with_directory(mut self, directory: Directory) -> Result<Self, DomainError> {
        self.insert_directory(directory)?;
        Ok(self)
    }

    /// Builder: add a file
    ///
    /// # Errors
    /// Returns [`DomainError::AlreadyExists`] if a file with the same name
    /// (ignoring case) is already present
    pub fn with_file(mut self, file: File) -> Result<Self, DomainError> {
        self.insert_file(file)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the tree root (empty for the root)
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the parent directory, `None` for the tree root
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        if self.path.is_empty() {
            None
        } else {
            Some(path::parent(&self.path))
        }
    }

    /// Child directories ordered by name
    pub fn directories(&self) -> impl Iterator<Item = &Directory> {
        self.directories.values()
    }

    /// Files directly in this directory ordered by name
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    /// Look up a direct child by name; a file wins over a directory
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FileSystemItem<'_>> {
        let key = path::key(name);
        self.files
            .get(&key)
            .map(FileSystemItem::File)
            .or_else(|| self.directories.get(&key).map(FileSystemItem::Directory))
    }

    /// Whether the directory has neither files nor subdirectories
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    // --- lookups ---

    /// Resolve a directory by relative path
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] for malformed paths,
    /// [`DomainError::DirectoryNotFound`] if any segment is missing
    pub fn get_directory(&self, relative_path: &str) -> Result<&Directory, DomainError> {
        path::validate_path(relative_path)?;
        self.find_directory(relative_path)
            .ok_or_else(|| DomainError::DirectoryNotFound(path::join(&self.path, relative_path)))
    }

    /// Resolve a file by relative path
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] for malformed paths,
    /// [`DomainError::FileNotFound`] if the file or any parent is missing
    pub fn get_file(&self, relative_path: &str) -> Result<&File, DomainError> {
        path::validate_path(relative_path)?;
        self.find_file(relative_path)
            .ok_or_else(|| DomainError::FileNotFound(path::join(&self.path, relative_path)))
    }

    /// Resolve the file version a reference points to
    ///
    /// The reference path is relative to this directory.
    ///
    /// # Errors
    /// [`DomainError::FileNotFound`] if no file exists at the path or the
    /// existing file does not match the reference's time or length
    pub fn get_file_by_reference(&self, reference: &FileReference) -> Result<&File, DomainError> {
        let file = self.get_file(reference.path())?;
        if reference.matches_version(file) {
            Ok(file)
        } else {
            Err(DomainError::FileNotFound(format!(
                "{} (version does not match {reference})",
                file.path()
            )))
        }
    }

    /// Whether a file exists at the relative path
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] for malformed paths
    pub fn file_exists(&self, relative_path: &str) -> Result<bool, DomainError> {
        path::validate_path(relative_path)?;
        Ok(self.find_file(relative_path).is_some())
    }

    /// Whether a file matching the reference exists
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] for malformed paths
    pub fn file_exists_by_reference(&self, reference: &FileReference) -> Result<bool, DomainError> {
        path::validate_path(reference.path())?;
        Ok(self
            .find_file(reference.path())
            .is_some_and(|file| reference.matches_version(file)))
    }

    /// Whether a directory exists at the relative path
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] for malformed paths
    pub fn directory_exists(&self, relative_path: &str) -> Result<bool, DomainError> {
        path::validate_path(relative_path)?;
        Ok(self.find_directory(relative_path).is_some())
    }

    fn find_directory(&self, relative_path: &str) -> Option<&Directory> {
        let (local_name, remaining) = path::split_first(relative_path);
        let child = self.directories.get(&path::key(local_name))?;
        match remaining {
            None => Some(child),
            Some(rest) => child.find_directory(rest),
        }
    }

    fn find_file(&self, relative_path: &str) -> Option<&File> {
        let (local_name, remaining) = path::split_first(relative_path);
        match remaining {
            None => self.files.get(&path::key(local_name)),
            Some(rest) => self
                .directories
                .get(&path::key(local_name))?
                .find_file(rest),
        }
    }

    // --- traversal ---

    /// All files of the subtree, depth-first, files before subdirectories
    #[must_use]
    pub fn all_files(&self) -> Vec<&File> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a File>) {
        out.extend(self.files.values());
        for dir in self.directories.values() {
            dir.collect_files(out);
        }
    }

    /// Paths whose file differs between `earlier` and `self`
    ///
    /// A path is reported when the file exists on only one side or the two
    /// versions differ. The casing of the newer side wins.
    #[must_use]
    pub fn changed_paths_since(&self, earlier: &Directory) -> Vec<String> {
        let before: HashMap<String, &File> = earlier
            .all_files()
            .into_iter()
            .map(|file| (path::key(file.path()), file))
            .collect();
        let after: HashMap<String, &File> = self
            .all_files()
            .into_iter()
            .map(|file| (path::key(file.path()), file))
            .collect();

        let mut changed: BTreeMap<String, String> = BTreeMap::new();
        for (key, file) in &after {
            match before.get(key) {
                Some(old) if old.is_same_version(file) => {}
                _ => {
                    changed.insert(key.clone(), file.path().to_string());
                }
            }
        }
        for (key, file) in &before {
            if !after.contains_key(key) {
                changed.insert(key.clone(), file.path().to_string());
            }
        }
        changed.into_values().collect()
    }

    // --- mutation (working copies) ---

    /// Insert a child directory, rebasing its subtree under this directory
    ///
    /// # Errors
    /// [`DomainError::AlreadyExists`] on a name clash
    pub fn insert_directory(&mut self, mut directory: Directory) -> Result<(), DomainError> {
        let key = path::key(&directory.name);
        if directory.name.is_empty() {
            return Err(DomainError::InvalidName(
                "cannot insert an unnamed root directory".to_string(),
            ));
        }
        if self.directories.contains_key(&key) {
            return Err(DomainError::AlreadyExists(path::join(
                &self.path,
                &directory.name,
            )));
        }
        directory.rebase(path::join(&self.path, &directory.name));
        self.directories.insert(key, directory);
        Ok(())
    }

    /// Insert a file directly in this directory
    ///
    /// # Errors
    /// [`DomainError::AlreadyExists`] on a name clash
    pub fn insert_file(&mut self, mut file: File) -> Result<(), DomainError> {
        let key = path::key(&file.name);
        if self.files.contains_key(&key) {
            return Err(DomainError::AlreadyExists(path::join(&self.path, &file.name)));
        }
        file.rebase(&self.path);
        self.files.insert(key, file);
        Ok(())
    }

    /// Remove a file directly in this directory by name
    ///
    /// # Errors
    /// [`DomainError::FileNotFound`] if no such file exists
    pub fn remove_file(&mut self, name: &str) -> Result<File, DomainError> {
        self.files
            .remove(&path::key(name))
            .ok_or_else(|| DomainError::FileNotFound(path::join(&self.path, name)))
    }

    /// Remove an empty child directory by name
    ///
    /// # Errors
    /// [`DomainError::DirectoryNotFound`] if no such directory exists,
    /// [`DomainError::ValidationFailed`] if it still has children
    pub fn remove_empty_directory(&mut self, name: &str) -> Result<Directory, DomainError> {
        let key = path::key(name);
        match self.directories.get(&key) {
            None => Err(DomainError::DirectoryNotFound(path::join(&self.path, name))),
            Some(dir) if !dir.is_empty() => Err(DomainError::ValidationFailed(format!(
                "directory '{}' is not empty",
                dir.path
            ))),
            Some(_) => self
                .directories
                .remove(&key)
                .ok_or_else(|| DomainError::DirectoryNotFound(path::join(&self.path, name))),
        }
    }

    /// Mutable lookup of a directory; the empty path is this directory
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] or [`DomainError::DirectoryNotFound`]
    pub fn get_directory_mut(&mut self, relative_path: &str) -> Result<&mut Directory, DomainError> {
        if relative_path.is_empty() {
            return Ok(self);
        }
        path::validate_path(relative_path)?;
        let full_path = path::join(&self.path, relative_path);
        self.find_directory_mut(relative_path)
            .ok_or(DomainError::DirectoryNotFound(full_path))
    }

    fn find_directory_mut(&mut self, relative_path: &str) -> Option<&mut Directory> {
        let (local_name, remaining) = path::split_first(relative_path);
        let child = self.directories.get_mut(&path::key(local_name))?;
        match remaining {
            None => Some(child),
            Some(rest) => child.find_directory_mut(rest),
        }
    }

    /// Return the directory at `relative_path`, creating missing directories
    ///
    /// The empty path is this directory.
    ///
    /// # Errors
    /// [`DomainError::InvalidPath`] for malformed paths
    pub fn ensure_directory_exists(
        &mut self,
        relative_path: &str,
    ) -> Result<&mut Directory, DomainError> {
        if relative_path.is_empty() {
            return Ok(self);
        }
        path::validate_path(relative_path)?;
        Ok(self.ensure_directory_unchecked(relative_path))
    }

    fn ensure_directory_unchecked(&mut self, relative_path: &str) -> &mut Directory {
        let (local_name, remaining) = path::split_first(relative_path);
        let parent_path = self.path.clone();
        let child = self
            .directories
            .entry(path::key(local_name))
            .or_insert_with(|| Directory {
                name: local_name.to_string(),
                path: path::join(&parent_path, local_name),
                directories: BTreeMap::new(),
                files: BTreeMap::new(),
            });
        match remaining {
            None => child,
            Some(rest) => child.ensure_directory_unchecked(rest),
        }
    }

    fn rebase(&mut self, new_path: String) {
        self.path = new_path;
        for file in self.files.values_mut() {
            file.rebase(&self.path);
        }
        for dir in self.directories.values_mut() {
            let child_path = path::join(&self.path, &dir.name);
            dir.rebase(child_path);
        }
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::root()
    }
}

// ============================================================================
// Serialized form
// ============================================================================

/// Nested serialized form of a tree; paths are recomputed when loading
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DirectoryRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    directories: Vec<DirectoryRecord>,
    #[serde(default)]
    files: Vec<FileRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileRecord {
    name: String,
    last_write_time: DateTime<Utc>,
    length: u64,
}

impl TryFrom<DirectoryRecord> for Directory {
    type Error = DomainError;

    fn try_from(record: DirectoryRecord) -> Result<Self, Self::Error> {
        let mut dir = if record.name.is_empty() {
            Directory::root()
        } else {
            Directory::new(record.name)?
        };
        for file in record.files {
            dir.insert_file(File::new(file.name, file.last_write_time, file.length)?)?;
        }
        for child in record.directories {
            dir.insert_directory(Directory::try_from(child)?)?;
        }
        Ok(dir)
    }
}

impl From<Directory> for DirectoryRecord {
    fn from(dir: Directory) -> Self {
        Self {
            name: dir.name,
            directories: dir.directories.into_values().map(Into::into).collect(),
            files: dir
                .files
                .into_values()
                .map(|file| FileRecord {
                    name: file.name,
                    last_write_time: file.last_write_time,
                    length: file.length,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn time(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, secs).unwrap()
    }

    /// root/dir1/{dir11, file1}
    fn sample_tree() -> Directory {
        let dir1 = Directory::new("dir1")
            .unwrap()
            .with_directory(Directory::new("dir11").unwrap())
            .unwrap()
            .with_file(File::new("file1", time(1), 10).unwrap())
            .unwrap();
        Directory::root().with_directory(dir1).unwrap()
    }

    // -- paths --

    #[test]
    fn test_paths_are_computed_from_ancestors() {
        let root = sample_tree();
        let dir11 = root.get_directory("dir1/dir11").unwrap();
        assert_eq!(dir11.path(), "dir1/dir11");
        assert_eq!(dir11.parent_path(), Some("dir1"));
        assert_eq!(root.parent_path(), None);

        let file = root.get_file("dir1/file1").unwrap();
        assert_eq!(file.path(), "dir1/file1");
        assert_eq!(file.parent_path(), "dir1");
    }

    #[test]
    fn test_nested_builder_rebases_deep_paths() {
        let inner = Directory::new("b")
            .unwrap()
            .with_file(File::new("f", time(0), 1).unwrap())
            .unwrap();
        let middle = Directory::new("a").unwrap().with_directory(inner).unwrap();
        assert_eq!(middle.get_file("b/f").unwrap().path(), "b/f");

        let root = Directory::root().with_directory(middle).unwrap();
        assert_eq!(root.get_file("a/b/f").unwrap().path(), "a/b/f");
    }

    // -- validation --

    #[test]
    fn test_lookups_reject_invalid_paths() {
        let root = sample_tree();
        for bad in ["", "  ", "/", "/name", "name/", "name\\name"] {
            assert!(matches!(root.get_file(bad), Err(DomainError::InvalidPath(_))));
            assert!(matches!(
                root.get_directory(bad),
                Err(DomainError::InvalidPath(_))
            ));
            assert!(matches!(
                root.file_exists(bad),
                Err(DomainError::InvalidPath(_))
            ));
            assert!(matches!(
                root.directory_exists(bad),
                Err(DomainError::InvalidPath(_))
            ));
        }
    }

    // -- traversal --

    #[test]
    fn test_get_file_returns_same_object_through_both_routes() {
        let root = sample_tree();
        let direct = root.get_file("dir1/file1").unwrap();
        let via_dir = root.get_directory("dir1").unwrap().get_file("file1").unwrap();
        assert!(std::ptr::eq(direct, via_dir));
    }

    #[test]
    fn test_file_exists() {
        let root = sample_tree();
        assert!(!root.file_exists("someFileName").unwrap());
        assert!(!root.file_exists("file1").unwrap());
        assert!(root.file_exists("dir1/file1").unwrap());
        assert!(root.get_directory("dir1").unwrap().file_exists("file1").unwrap());
        assert!(!root.file_exists("missing/file1").unwrap());
    }

    #[test]
    fn test_directory_exists() {
        let root = sample_tree();
        assert!(root.directory_exists("dir1").unwrap());
        assert!(root.directory_exists("dir1/dir11").unwrap());
        assert!(root.directory_exists("DIR1/Dir11").unwrap());
        assert!(!root.directory_exists("dir1/file1").unwrap());
        assert!(!root.directory_exists("dir2/dir11").unwrap());
    }

    #[test]
    fn test_get_missing_items_fail_with_not_found() {
        let root = sample_tree();
        assert_eq!(
            root.get_file("dir1/nope"),
            Err(DomainError::FileNotFound("dir1/nope".to_string()))
        );
        assert_eq!(
            root.get_directory("dir2/dir11"),
            Err(DomainError::DirectoryNotFound("dir2/dir11".to_string()))
        );
    }

    #[test]
    fn test_indexer_prefers_file() {
        let root = Directory::root()
            .with_directory(Directory::new("x").unwrap())
            .unwrap()
            .with_file(File::new("x", time(0), 0).unwrap())
            .unwrap()
            .with_directory(Directory::new("y").unwrap())
            .unwrap();

        assert!(matches!(root.get("X"), Some(FileSystemItem::File(_))));
        assert!(matches!(root.get("y"), Some(FileSystemItem::Directory(_))));
        assert_eq!(root.get("y").map(|item| item.path()), Some("y"));
        assert!(root.get("z").is_none());
    }

    // -- references --

    #[test]
    fn test_get_file_by_reference() {
        let root = sample_tree();
        let exact = FileReference::new("dir1/file1")
            .unwrap()
            .with_last_write_time(time(1))
            .with_length(10);
        assert!(root.get_file_by_reference(&exact).is_ok());

        let wrong_length = FileReference::new("dir1/file1").unwrap().with_length(11);
        assert!(matches!(
            root.get_file_by_reference(&wrong_length),
            Err(DomainError::FileNotFound(_))
        ));

        let wrong_time = FileReference::new("dir1/file1")
            .unwrap()
            .with_last_write_time(time(2));
        assert!(matches!(
            root.get_file_by_reference(&wrong_time),
            Err(DomainError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_file_exists_by_reference() {
        let root = sample_tree();
        let by_path = FileReference::new("dir1/file1").unwrap();
        assert!(root.file_exists_by_reference(&by_path).unwrap());
        assert!(root
            .file_exists_by_reference(&by_path.clone().with_length(10))
            .unwrap());
        assert!(!root
            .file_exists_by_reference(&by_path.with_length(99))
            .unwrap());
        assert!(!root
            .file_exists_by_reference(&FileReference::new("dir1/other").unwrap())
            .unwrap());
    }

    // -- mutation --

    #[test]
    fn test_ensure_directory_exists_creates_chain() {
        let mut root = Directory::root();
        let created = root.ensure_directory_exists("a/b/c").unwrap();
        assert_eq!(created.path(), "a/b/c");
        assert!(root.directory_exists("a/b").unwrap());

        let again = root.ensure_directory_exists("A/b").unwrap();
        assert_eq!(again.path(), "a/b");
    }

    #[test]
    fn test_remove_empty_directory_only_removes_empty_children() {
        let mut root = Directory::root();
        root.ensure_directory_exists("a/b").unwrap();

        assert!(matches!(
            root.remove_empty_directory("a"),
            Err(DomainError::ValidationFailed(_))
        ));
        root.get_directory_mut("a")
            .unwrap()
            .remove_empty_directory("B")
            .unwrap();
        root.remove_empty_directory("a").unwrap();
        assert!(matches!(
            root.remove_empty_directory("a"),
            Err(DomainError::DirectoryNotFound(_))
        ));
        assert_eq!(root, Directory::root());
    }

    #[test]
    fn test_insert_and_remove_file() {
        let mut root = sample_tree();
        let dir = root.get_directory_mut("dir1").unwrap();
        dir.insert_file(File::new("file2", time(3), 5).unwrap()).unwrap();
        assert_eq!(root.get_file("dir1/file2").unwrap().path(), "dir1/file2");

        let dir = root.get_directory_mut("dir1").unwrap();
        assert!(matches!(
            dir.insert_file(File::new("FILE2", time(3), 5).unwrap()),
            Err(DomainError::AlreadyExists(_))
        ));
        let removed = dir.remove_file("file2").unwrap();
        assert_eq!(removed.length(), 5);
        assert!(dir.remove_file("file2").is_err());
        assert_eq!(root, sample_tree());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample_tree();
        let mut copy = original.clone();
        copy.get_directory_mut("dir1").unwrap().remove_file("file1").unwrap();
        assert!(original.file_exists("dir1/file1").unwrap());
        assert!(!copy.file_exists("dir1/file1").unwrap());
    }

    // -- comparison --

    #[test]
    fn test_changed_paths_since() {
        let before = sample_tree()
            .with_file(File::new("gone.txt", time(0), 1).unwrap())
            .unwrap();
        let mut after = sample_tree();
        after
            .get_directory_mut("dir1")
            .unwrap()
            .remove_file("file1")
            .unwrap();
        after
            .get_directory_mut("dir1")
            .unwrap()
            .insert_file(File::new("file1", time(9), 10).unwrap())
            .unwrap();
        after
            .insert_file(File::new("new.txt", time(0), 2).unwrap())
            .unwrap();

        let changed = after.changed_paths_since(&before);
        assert_eq!(changed, vec!["dir1/file1", "gone.txt", "new.txt"]);
        assert!(before.changed_paths_since(&before).is_empty());
    }

    // -- serde --

    #[test]
    fn test_serde_roundtrip_restores_paths() {
        let root = sample_tree();
        let json = serde_json::to_string(&root).unwrap();
        let parsed: Directory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, root);
        assert_eq!(parsed.get_file("dir1/file1").unwrap().path(), "dir1/file1");
    }
}
