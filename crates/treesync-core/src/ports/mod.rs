//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ISnapshotStore`] - Histories and their snapshots
//! - [`IMultiSnapshotStore`] - Points in time across all histories
//! - [`ISyncPointRepository`] - Records of completed synchronizations
//! - [`IGroupManager`] - Sync groups and their folders
//! - [`IConflictRepository`] - Unresolved conflicts awaiting a decision

pub mod conflict_repository;
pub mod group_manager;
pub mod snapshot_store;

pub use conflict_repository::{ConflictError, IConflictRepository};
pub use group_manager::{GroupError, IGroupManager};
pub use snapshot_store::{IMultiSnapshotStore, ISnapshotStore, ISyncPointRepository, StoreError};
