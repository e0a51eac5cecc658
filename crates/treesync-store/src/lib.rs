//! treesync Store - Snapshot storage adapters
//!
//! Implementations of the storage ports from `treesync-core`:
//! - Histories and snapshots
//! - Multi-history snapshots
//! - Sync points
//! - Unresolved conflicts
//! - Sync groups
//!
//! ## Architecture
//!
//! This crate implements the `ISnapshotStore`, `IMultiSnapshotStore`,
//! `ISyncPointRepository`, `IConflictRepository` and `IGroupManager` ports. It is a driven
//! (secondary) adapter in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`InMemorySnapshotStore`] - Volatile store with sequence-number ids
//! - [`DirectorySnapshotStore`] - JSON state in a directory, content-hash ids
//! - [`ConfigGroupManager`] - Sync groups kept in the YAML configuration
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use treesync_core::domain::{Directory, HistoryName};
//! use treesync_core::ports::ISnapshotStore;
//! use treesync_store::DirectorySnapshotStore;
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = Arc::new(DirectorySnapshotStore::open(DirectorySnapshotStore::default_dir())?);
//! let docs = HistoryName::new("docs")?;
//! store.create_history(&docs)?;
//! store.create_snapshot(&docs, Directory::root())?;
//! # Ok(())
//! # }
//! ```

mod conflicts;
pub mod directory;
pub mod groups;
pub mod memory;

pub use directory::DirectorySnapshotStore;
pub use groups::ConfigGroupManager;
pub use memory::InMemorySnapshotStore;
