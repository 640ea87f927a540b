//! Application layer for rtichat.
//!
//! This crate provides the use case implementation that coordinates between
//! the domain core, the local snapshot cache, and the remote conversation
//! store.

pub mod sync_usecase;

pub use sync_usecase::SyncCoordinator;
