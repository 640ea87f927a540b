//! Persistent snapshot cache interface.
//!
//! The client survives restarts by writing its full session state as a
//! single namespaced blob after every mutation and reading it back once at
//! startup. This module defines the blob shape and the storage port; the
//! file-backed implementation lives in the infrastructure crate.

use crate::session::{Message, Session};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Schema version written into every snapshot blob.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "1.0.0";

/// Ephemeral-mode portion of the snapshot blob.
///
/// Present for blob-format completeness only: ephemeral sessions are never
/// persisted, so saved snapshots always carry this field inactive and empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemeralState {
    /// Whether an ephemeral session was active.
    #[serde(default)]
    pub active: bool,
    /// Ephemeral message buffer.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Full persisted state of the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Blob schema version, for forward compatibility checks.
    pub schema_version: String,
    /// Id of the session that was active when the snapshot was taken.
    pub active_id: Option<String>,
    /// The session list, in display order.
    pub sessions: Vec<Session>,
    /// Ephemeral-mode state (always inactive in saved snapshots).
    #[serde(default)]
    pub ephemeral: EphemeralState,
}

impl Default for Snapshot {
    /// The empty-state sentinel: what `load` returns when nothing usable is
    /// stored.
    fn default() -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            active_id: None,
            sessions: Vec::new(),
            ephemeral: EphemeralState::default(),
        }
    }
}

impl Snapshot {
    /// True if this snapshot carries no session state at all.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.active_id.is_none()
    }
}

/// An abstract store for the persisted snapshot blob.
///
/// Both operations are infallible by contract: the in-memory state is the
/// source of truth for the current runtime, so cache trouble must never
/// disturb the caller.
///
/// - `save` is fire-and-forget; implementations log and swallow failures.
/// - `load` falls back to [`Snapshot::default`] when the stored data is
///   missing or unreadable.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Writes a full snapshot, replacing any previous one.
    async fn save(&self, snapshot: &Snapshot);

    /// Returns the last saved snapshot, or the empty sentinel.
    async fn load(&self) -> Snapshot;
}
