//! treesync Core - Domain model for version-aware tree synchronization
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Directory`, `File`, `FileReference`, `Snapshot`,
//!   `MultiHistorySnapshot`, `Change`, `ChangeList`, `SyncPoint`, `ConflictInfo`
//! - **Port definitions** - Traits for adapters: `ISnapshotStore`,
//!   `IMultiSnapshotStore`, `ISyncPointRepository`, `IGroupManager`,
//!   `IConflictRepository`
//! - **Configuration** - YAML-backed settings and sync groups
//! - **Logging** - tracing subscriber setup
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure logic over in-memory trees.
//! Ports define trait interfaces that adapter crates implement.
//! The diff engines and the synchronizer live in their own crates and only
//! talk to storage through the ports.

pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
