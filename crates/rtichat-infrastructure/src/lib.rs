//! Infrastructure layer for rtichat.
//!
//! This crate provides the file-backed implementations of the core's
//! persistence ports, plus platform path resolution.

pub mod paths;
pub mod snapshot_store;

pub use paths::RtichatPaths;
pub use snapshot_store::FileSnapshotStore;
