//! Canonical in-process session state.
//!
//! `SessionStore` owns the ordered session list, the active-session pointer,
//! and the ephemeral slot. It is a plain synchronous structure: the
//! coordinator owns it behind a lock and serializes every mutation, so the
//! store itself never suspends.

use super::message::{Message, Sender};
use super::model::{Lifecycle, Session};
use crate::cache::Snapshot;
use crate::error::{ChatError, Result};
use crate::remote::RemoteSessionSummary;
use std::collections::HashSet;
use tokio::sync::watch;

/// Canonical list of chat sessions plus the active-session pointer.
///
/// Ordering invariant: sessions are kept most-recently-updated first, except
/// that the provisional session (at most one) is always pinned to the front.
/// The ephemeral session, when present, lives in a dedicated slot outside
/// the list so that neither persistence nor reconciliation can touch it.
pub struct SessionStore {
    sessions: Vec<Session>,
    active_id: Option<String>,
    ephemeral: Option<Session>,
    revision: watch::Sender<u64>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            sessions: Vec::new(),
            active_id: None,
            ephemeral: None,
            revision,
        }
    }

    // ============================================================================
    // Read access
    // ============================================================================

    /// The session list in display order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Id of the active session, if any.
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Looks up a session by id, checking the ephemeral slot first.
    pub fn session(&self, id: &str) -> Option<&Session> {
        if let Some(eph) = &self.ephemeral {
            if eph.id == id {
                return Some(eph);
            }
        }
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The currently active session, resolving the ephemeral slot first.
    pub fn active_session(&self) -> Option<&Session> {
        let id = self.active_id.as_deref()?;
        self.session(id)
    }

    /// The ephemeral session, if one is active.
    pub fn ephemeral(&self) -> Option<&Session> {
        self.ephemeral.as_ref()
    }

    /// True while an ephemeral session occupies the slot.
    pub fn ephemeral_active(&self) -> bool {
        self.ephemeral.is_some()
    }

    /// Subscribes to change notifications.
    ///
    /// The watched value is a revision counter bumped on every mutation; a
    /// UI layer can await changes instead of polling.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Inserts a session, or replaces the existing entry with the same id.
    pub fn upsert_session(&mut self, session: Session) {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(slot) => *slot = session,
            None => self.sessions.push(session),
        }
        self.resort();
        self.bump();
    }

    /// Rewrites `old_id` to `new_id` everywhere it appears, as a single
    /// atomic step.
    ///
    /// Used exactly once per session, at the moment a provisional session is
    /// confirmed by the remote store; the session transitions to persisted
    /// in the same step. A no-op if `old_id` is not present.
    pub fn remap_id(&mut self, old_id: &str, new_id: &str) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == old_id) else {
            return;
        };

        session.id = new_id.to_string();
        if session.is_provisional() {
            session.lifecycle = Lifecycle::Persisted;
        }
        if self.active_id.as_deref() == Some(old_id) {
            self.active_id = Some(new_id.to_string());
        }
        self.resort();
        self.bump();
    }

    /// Removes a session from the list.
    ///
    /// If the removed session was active, the first remaining session
    /// becomes active; a fresh provisional "new chat" session is created
    /// when the removal empties the list.
    pub fn remove_session(&mut self, id: &str) {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return;
        }

        if self.active_id.as_deref() == Some(id) {
            if self.sessions.is_empty() {
                let fresh = Session::new_provisional();
                self.active_id = Some(fresh.id.clone());
                self.sessions.push(fresh);
            } else {
                self.active_id = Some(self.sessions[0].id.clone());
            }
        }
        self.bump();
    }

    /// Replaces any existing provisional session with `fresh` and makes it
    /// active.
    ///
    /// This is the "new chat" operation: the previous new-chat slot (if any)
    /// is discarded, never archived, since it was by definition unconfirmed.
    pub fn replace_provisional(&mut self, fresh: Session) {
        self.sessions.retain(|s| !s.is_provisional());
        self.active_id = Some(fresh.id.clone());
        self.sessions.push(fresh);
        self.resort();
        self.bump();
    }

    /// Makes the session with `id` active. Silent no-op if `id` is unknown.
    pub fn set_active(&mut self, id: &str) {
        if self.session(id).is_none() {
            return;
        }
        self.active_id = Some(id.to_string());
        self.bump();
    }

    /// Puts a session into the ephemeral slot and makes it active.
    ///
    /// The previously active non-ephemeral state is suspended in place, not
    /// destroyed: the list and its ordering are untouched.
    pub fn activate_ephemeral(&mut self, session: Session) {
        self.active_id = Some(session.id.clone());
        self.ephemeral = Some(session);
        self.bump();
    }

    /// Clears the ephemeral slot, discarding its messages.
    ///
    /// If the ephemeral session was active, activation falls back to the
    /// first list entry; callers usually set a new active session right
    /// after.
    pub fn deactivate_ephemeral(&mut self) {
        let Some(eph) = self.ephemeral.take() else {
            return;
        };
        if self.active_id.as_deref() == Some(eph.id.as_str()) {
            self.active_id = self.sessions.first().map(|s| s.id.clone());
        }
        self.bump();
    }

    /// Appends a message to the session with `id`.
    pub fn append_message(&mut self, id: &str, message: Message) -> Result<()> {
        let session = self
            .session_mut(id)
            .ok_or_else(|| ChatError::invalid_operation(format!("unknown session: {id}")))?;
        session.push_message(message);
        self.resort();
        self.bump();
        Ok(())
    }

    /// Sets a session's title.
    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> Result<()> {
        let session = self
            .session_mut(id)
            .ok_or_else(|| ChatError::invalid_operation(format!("unknown session: {id}")))?;
        session.title = title.into();
        session.touch();
        self.resort();
        self.bump();
        Ok(())
    }

    /// Replaces a session's message buffer with history fetched from the
    /// remote store.
    ///
    /// Does not refresh `updated_at`: loading history is not an edit.
    pub fn set_messages(&mut self, id: &str, messages: Vec<Message>) -> Result<()> {
        let session = self
            .session_mut(id)
            .ok_or_else(|| ChatError::invalid_operation(format!("unknown session: {id}")))?;
        session.messages = messages;
        session.message_count_hint = None;
        self.bump();
        Ok(())
    }

    /// Replaces the text of an assistant message in place.
    ///
    /// User messages are never editable; attempting to edit one is rejected
    /// before any state changes.
    pub fn edit_assistant_message(&mut self, session_id: &str, message_id: &str, text: impl Into<String>) -> Result<()> {
        let session = self
            .session_mut(session_id)
            .ok_or_else(|| ChatError::invalid_operation(format!("unknown session: {session_id}")))?;
        let message = session
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| ChatError::invalid_operation(format!("unknown message: {message_id}")))?;
        if message.sender != Sender::Assistant {
            return Err(ChatError::invalid_operation(
                "only assistant messages can be edited",
            ));
        }
        message.text = text.into();
        session.touch();
        self.resort();
        self.bump();
        Ok(())
    }

    // ============================================================================
    // Reconciliation
    // ============================================================================

    /// Merges the authoritative remote session list into local state.
    ///
    /// - Every remote entry becomes or updates a persisted local entry,
    ///   keyed by its remote id. Existing entries keep their loaded message
    ///   history; title and timestamp follow the remote.
    /// - The provisional session, if any, is preserved verbatim — unless a
    ///   remote entry carries the same id, in which case the persisted entry
    ///   wins (the remote store is the tie-breaking authority for confirmed
    ///   sessions).
    /// - Local persisted sessions absent from the remote list were deleted
    ///   elsewhere and are dropped.
    /// - `tombstones` names sessions deleted locally while this merge's
    ///   fetch was in flight; those remote entries are skipped for this
    ///   merge only.
    /// - The active id survives when it can; otherwise the first merged
    ///   entry becomes active. The ephemeral slot is never touched.
    ///
    /// Re-merging the same remote list against the result is a no-op.
    pub fn merge_remote(&mut self, remote: &[RemoteSessionSummary], tombstones: &HashSet<String>) {
        let mut merged: Vec<Session> = Vec::with_capacity(remote.len() + 1);

        for summary in remote {
            if tombstones.contains(&summary.id) {
                continue;
            }
            match self
                .sessions
                .iter()
                .find(|s| s.id == summary.id && s.is_persisted())
            {
                Some(local) => {
                    let mut session = local.clone();
                    session.title = summary.title.clone();
                    session.updated_at = summary.updated_at.clone();
                    if session.messages.is_empty() {
                        session.message_count_hint = summary.message_count;
                    }
                    merged.push(session);
                }
                None => merged.push(Session::from_remote(summary)),
            }
        }

        if let Some(provisional) = self.sessions.iter().find(|s| s.is_provisional()) {
            let collided = merged.iter().any(|s| s.id == provisional.id);
            if !collided {
                merged.push(provisional.clone());
            }
        }

        self.sessions = merged;
        self.resort();

        let active_survives = match self.active_id.as_deref() {
            Some(id) => self.session(id).is_some(),
            None => false,
        };
        if !active_survives {
            self.active_id = self.sessions.first().map(|s| s.id.clone());
        }
        self.bump();
    }

    // ============================================================================
    // Snapshot round-trip
    // ============================================================================

    /// Captures the persistable state as a snapshot blob.
    ///
    /// The ephemeral slot never appears in snapshots; an active id pointing
    /// at it is persisted as "no active session".
    pub fn snapshot(&self) -> Snapshot {
        let active_id = self
            .active_id
            .clone()
            .filter(|id| self.sessions.iter().any(|s| &s.id == id));
        Snapshot {
            active_id,
            sessions: self.sessions.clone(),
            ..Snapshot::default()
        }
    }

    /// Restores state from a snapshot blob.
    ///
    /// Ephemeral-tagged sessions are dropped if a tampered blob carries any;
    /// a dangling active id is normalized to the first session.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.sessions = snapshot
            .sessions
            .into_iter()
            .filter(|s| !s.is_ephemeral())
            .collect();
        self.resort();

        self.active_id = snapshot
            .active_id
            .filter(|id| self.sessions.iter().any(|s| &s.id == id))
            .or_else(|| self.sessions.first().map(|s| s.id.clone()));
        self.ephemeral = None;
        self.bump();
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        if let Some(eph) = self.ephemeral.as_mut() {
            if eph.id == id {
                return Some(eph);
            }
        }
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Restores the ordering invariant: most-recently-updated first, with
    /// the provisional session pinned to the front. RFC 3339 UTC timestamps
    /// order lexicographically.
    fn resort(&mut self) {
        self.sessions
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(pos) = self.sessions.iter().position(|s| s.is_provisional()) {
            if pos > 0 {
                let provisional = self.sessions.remove(pos);
                self.sessions.insert(0, provisional);
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
