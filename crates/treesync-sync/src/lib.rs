//! treesync Sync - Two-way synchronization engine
//!
//! Provides:
//! - Version graphs that stay acyclic when a file returns to an old version
//! - Typed sync actions and conflicts
//! - Application of actions to a working copy of a directory tree
//! - Per-path comparison of two participants' changes
//! - A JSON codec for persisted actions
//!
//! ## Modules
//!
//! - [`change_graph`] - Acyclic graph over change values
//! - [`action`] - Add/remove/replace actions and participants
//! - [`conflict`] - Multiple-version and modification/deletion conflicts
//! - [`apply`] - Action applier and version comparers
//! - [`action_set`] - Action sets and synchronizer results
//! - [`synchronizer`] - Computes actions and conflicts for two participants
//! - [`serializer`] - Persisted action format

pub mod action;
pub mod action_set;
pub mod apply;
pub mod change_graph;
pub mod conflict;
pub mod error;
pub mod serializer;
pub mod synchronizer;

pub use action::{SyncAction, SyncActionKind, SyncParticipant};
pub use action_set::{SyncActionSet, SynchronizerResult};
pub use apply::{MetadataComparer, VersionComparer};
pub use change_graph::ChangeGraph;
pub use conflict::SyncConflict;
pub use error::SyncError;
pub use synchronizer::{ParticipantChanges, Synchronizer};
