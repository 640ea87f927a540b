//! Domain core of the rtichat client.
//!
//! Holds the session models, the canonical in-process [`SessionStore`],
//! title derivation, the shared [`ChatError`] type, and the two outbound
//! ports the synchronization engine talks through: [`cache::SnapshotStore`]
//! for the local persistent cache and [`remote::RemoteConversationClient`]
//! for the authoritative backend.
//!
//! [`SessionStore`]: session::SessionStore

pub mod cache;
pub mod error;
pub mod remote;
pub mod session;

// Re-export common error type
pub use error::ChatError;
