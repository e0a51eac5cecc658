//! Relative tree paths
//!
//! Paths inside a tree are `/`-separated and relative to the tree root:
//! `"dir1/file1"`. The root itself has the empty path. Helpers here validate
//! paths before any traversal and split them into their first segment and the
//! remainder.

use super::errors::DomainError;

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Characters that may never appear in a path or a name
const RESERVED_CHARS: &[char] = &['\\', '"', '<', '>', '|', '\0'];

/// Validate a relative path
///
/// Checks run in order: blank, leading separator, trailing separator, empty
/// segment, reserved characters, then each segment as a name.
///
/// # Errors
/// Returns [`DomainError::InvalidPath`] describing the first failed check
pub fn validate_path(path: &str) -> Result<(), DomainError> {
    if path.trim().is_empty() {
        return Err(DomainError::InvalidPath(
            "path must not be empty or whitespace".to_string(),
        ));
    }
    if path.starts_with(SEPARATOR) {
        return Err(DomainError::InvalidPath(format!(
            "path must not start with '{SEPARATOR}': {path}"
        )));
    }
    if path.ends_with(SEPARATOR) {
        return Err(DomainError::InvalidPath(format!(
            "path must not end with '{SEPARATOR}': {path}"
        )));
    }
    if let Some(c) = path
        .chars()
        .find(|c| RESERVED_CHARS.contains(c) || c.is_control())
    {
        return Err(DomainError::InvalidPath(format!(
            "path contains invalid character {c:?}: {path}"
        )));
    }
    for segment in path.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(DomainError::InvalidPath(format!(
                "path contains an empty segment: {path}"
            )));
        }
        if segment == "." || segment == ".." {
            return Err(DomainError::InvalidPath(format!(
                "path contains invalid traversal: {path}"
            )));
        }
    }
    Ok(())
}

/// Validate a single file or directory name
///
/// # Errors
/// Returns [`DomainError::InvalidName`] if the name is blank, contains a
/// separator or reserved character, or is `.`/`..`
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(
            "name must not be empty or whitespace".to_string(),
        ));
    }
    if name.contains(SEPARATOR)
        || name
            .chars()
            .any(|c| RESERVED_CHARS.contains(&c) || c.is_control())
    {
        return Err(DomainError::InvalidName(format!(
            "name contains invalid characters: {name}"
        )));
    }
    if name == "." || name == ".." {
        return Err(DomainError::InvalidName(format!("reserved name: {name}")));
    }
    Ok(())
}

/// Split a validated path into its first segment and the remaining path
///
/// `"a/b/c"` yields `("a", Some("b/c"))`, `"a"` yields `("a", None)`.
#[must_use]
pub fn split_first(path: &str) -> (&str, Option<&str>) {
    match path.split_once(SEPARATOR) {
        Some((local, rest)) => (local, Some(rest)),
        None => (path, None),
    }
}

/// Join a parent path and a child name (an empty parent is the root)
#[must_use]
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Parent path of `path`, or the empty string for top-level items
#[must_use]
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Last segment of `path`
#[must_use]
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Case-insensitive comparison key for a path or name
#[must_use]
pub fn key(path: &str) -> String {
    path.to_lowercase()
}

/// Case-insensitive path equality
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || key(a) == key(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank() {
        assert!(matches!(validate_path(""), Err(DomainError::InvalidPath(_))));
        assert!(matches!(validate_path("  "), Err(DomainError::InvalidPath(_))));
    }

    #[test]
    fn test_validate_rejects_separators_at_edges() {
        for path in ["/", "/name", "/name/other", "name/", "name/other/"] {
            assert!(
                matches!(validate_path(path), Err(DomainError::InvalidPath(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_backslash() {
        assert!(validate_path("name\\name").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_segment_and_traversal() {
        assert!(validate_path("a//b").is_err());
        assert!(validate_path("a/../b").is_err());
        assert!(validate_path(".").is_err());
    }

    #[test]
    fn test_validate_accepts_nested() {
        assert!(validate_path("dir1/file1").is_ok());
        assert!(validate_path("file with spaces.txt").is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("file1").is_ok());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn test_split_first() {
        assert_eq!(split_first("a/b/c"), ("a", Some("b/c")));
        assert_eq!(split_first("a"), ("a", None));
    }

    #[test]
    fn test_join_parent_and_file_name() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a/b", "c"), "a/b/c");
        assert_eq!(parent("a/b/c"), "a/b");
        assert_eq!(parent("a"), "");
        assert_eq!(file_name("a/b/c"), "c");
        assert_eq!(file_name("c"), "c");
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Dir/File.TXT", "dir/file.txt"));
        assert!(!eq_ignore_case("dir/a", "dir/b"));
    }
}
