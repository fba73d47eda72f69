//! Persistence layer
//!
//! Spaces are persisted as JSON snapshots, one file per space, written
//! after each successful mutation and loaded at startup. Omitting the data
//! path runs the server purely in memory.

pub mod snapshot;

pub use snapshot::{SnapshotError, SnapshotResult, SnapshotStore};
