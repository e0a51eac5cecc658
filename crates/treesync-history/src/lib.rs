//! treesync History - Snapshot diffing
//!
//! Provides:
//! - Diffs between two snapshots of one history, with per-path change lists
//! - Combined diffs across every history of a multi-history snapshot
//! - Resolution of file references against a history
//!
//! ## Modules
//!
//! - [`diff`] - Single-history diff engine
//! - [`multi`] - Multi-history diff engine merging change lists by path

pub mod diff;
pub mod error;
pub mod multi;

pub use diff::HistoryDiffEngine;
pub use error::HistoryError;
pub use multi::MultiHistoryDiffEngine;
