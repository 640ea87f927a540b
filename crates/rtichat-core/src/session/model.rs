//! Session domain model.
//!
//! This module contains the core Session entity that represents
//! a chat conversation in the client's domain layer.

use super::message::Message;
use crate::remote::RemoteSessionSummary;
use serde::{Deserialize, Serialize};

/// Default display title for a session that has not earned one yet.
///
/// Purely cosmetic; lifecycle decisions are made on the [`Lifecycle`] tag,
/// never on the title, so a user conversation titled "New Chat" stays
/// unambiguous.
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Where a session stands relative to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Created locally, not yet confirmed to exist remotely. At most one
    /// provisional session exists at a time (the "new chat" slot).
    Provisional,
    /// Confirmed to exist remotely; `id` is the remote-assigned identifier.
    Persisted,
    /// Never cached or sent to the remote store; exists only for the
    /// current runtime.
    Ephemeral,
}

/// A chat conversation as held in the client.
///
/// A session contains:
/// - The ordered message history
/// - A human-readable title
/// - A lifecycle tag placing it relative to the remote store
/// - Timestamps for creation and last update (RFC 3339 strings)
///
/// This is the "pure" domain model that the synchronization logic operates
/// on, independent of any storage format or transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier. Locally generated (UUID) for provisional and
    /// ephemeral sessions, remote-assigned once persisted.
    pub id: String,
    /// Human-readable session title.
    pub title: String,
    /// Ordered message history, oldest first.
    pub messages: Vec<Message>,
    /// Where this session stands relative to the remote store.
    pub lifecycle: Lifecycle,
    /// Timestamp when the session was created (RFC 3339 format).
    pub created_at: String,
    /// Timestamp when the session was last updated (RFC 3339 format).
    pub updated_at: String,
    /// Remote-reported message count, carried while the message history has
    /// not been fetched yet. Cleared once messages are loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count_hint: Option<u32>,
}

impl Session {
    /// Creates a fresh provisional session (the "new chat" slot).
    pub fn new_provisional() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            lifecycle: Lifecycle::Provisional,
            created_at: now.clone(),
            updated_at: now,
            message_count_hint: None,
        }
    }

    /// Creates a transient session that never touches any store.
    pub fn new_ephemeral() -> Self {
        Self {
            lifecycle: Lifecycle::Ephemeral,
            ..Self::new_provisional()
        }
    }

    /// Materializes a persisted session from a remote list entry.
    ///
    /// The message history starts empty and is fetched lazily on selection;
    /// the remote message count is kept as a display hint until then.
    pub fn from_remote(summary: &RemoteSessionSummary) -> Self {
        Self {
            id: summary.id.clone(),
            title: summary.title.clone(),
            messages: Vec::new(),
            lifecycle: Lifecycle::Persisted,
            created_at: summary.updated_at.clone(),
            updated_at: summary.updated_at.clone(),
            message_count_hint: summary.message_count,
        }
    }

    /// True if this session has not been confirmed remotely yet.
    pub fn is_provisional(&self) -> bool {
        self.lifecycle == Lifecycle::Provisional
    }

    /// True if this session is confirmed to exist remotely.
    pub fn is_persisted(&self) -> bool {
        self.lifecycle == Lifecycle::Persisted
    }

    /// True if this session is excluded from all persistence.
    pub fn is_ephemeral(&self) -> bool {
        self.lifecycle == Lifecycle::Ephemeral
    }

    /// Refreshes `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Appends a message and refreshes `updated_at`.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.message_count_hint = None;
        self.touch();
    }

    /// Number of messages, preferring the loaded history over the remote
    /// hint.
    pub fn message_count(&self) -> usize {
        if self.messages.is_empty() {
            self.message_count_hint.unwrap_or(0) as usize
        } else {
            self.messages.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_session_starts_empty() {
        let session = Session::new_provisional();

        assert!(session.is_provisional());
        assert_eq!(session.title, NEW_CHAT_TITLE);
        assert!(session.messages.is_empty());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn ephemeral_session_is_tagged() {
        let session = Session::new_ephemeral();
        assert!(session.is_ephemeral());
        assert!(!session.is_provisional());
    }

    #[test]
    fn from_remote_keeps_count_hint_until_messages_load() {
        let summary = RemoteSessionSummary {
            id: "s1".to_string(),
            title: "Passport RTI".to_string(),
            updated_at: "2025-05-01T10:00:00+00:00".to_string(),
            message_count: Some(4),
        };

        let mut session = Session::from_remote(&summary);
        assert!(session.is_persisted());
        assert_eq!(session.message_count(), 4);

        session.push_message(Message::assistant("loaded"));
        assert_eq!(session.message_count(), 1);
        assert!(session.message_count_hint.is_none());
    }
}
