//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including path validation, tree lookups and change construction.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid file or directory name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// No file exists at the given path (or it does not match the reference)
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// No directory exists at the given path
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// A file or directory with the same name already exists
    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    /// A change or change list violates its construction rules
    #[error("Invalid change: {0}")]
    InvalidChange(String),

    /// Invalid glob pattern in a filter
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why the pattern was rejected
        reason: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
