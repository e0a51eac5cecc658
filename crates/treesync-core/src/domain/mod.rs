//! Domain entities and business logic
//!
//! This module contains the core domain types for treesync:
//! - Newtypes for identifiers and history names
//! - Relative path validation
//! - Directory trees and file references
//! - Snapshots and multi-history snapshots
//! - Changes, change lists and diffs
//! - Path filters, sync points and conflict records
//! - Domain-specific error types

pub mod change;
pub mod conflict_info;
pub mod errors;
pub mod filesystem;
pub mod filter;
pub mod newtypes;
pub mod path;
pub mod reference;
pub mod snapshot;
pub mod sync_point;

// Re-export commonly used types
pub use change::{Change, ChangeList, ChangeType, FileSystemDiff, MultiFileSystemDiff};
pub use conflict_info::ConflictInfo;
pub use errors::DomainError;
pub use filesystem::{Directory, File, FileSystemItem};
pub use filter::{FilterConfiguration, PathFilter};
pub use newtypes::*;
pub use reference::FileReference;
pub use snapshot::{MultiHistorySnapshot, Snapshot};
pub use sync_point::SyncPoint;
