//! Remote conversation store interface.
//!
//! Defines the contract against the authoritative backend store. The core
//! never talks HTTP itself; it sees the remote only through
//! [`RemoteConversationClient`], which keeps the synchronization logic
//! testable with in-memory fakes.

use crate::error::Result;
use crate::session::{AttachmentRef, Sender};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Summary entry of the remote conversation list.
///
/// The remote list endpoint returns titles and timestamps only; message
/// bodies are fetched lazily per conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSessionSummary {
    /// Remote-assigned conversation identifier.
    pub id: String,
    /// Conversation title.
    pub title: String,
    /// Timestamp of the last update (RFC 3339 format).
    pub updated_at: String,
    /// Number of messages stored remotely, when the backend reports it.
    #[serde(default)]
    pub message_count: Option<u32>,
}

/// A message as returned by the remote message-history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    /// Which side of the conversation produced this message.
    pub sender: Sender,
    /// The message content.
    pub text: String,
    /// Timestamp when the message was created (RFC 3339 format).
    pub created_at: String,
}

/// Result of a successful message round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// The assistant's reply text.
    pub assistant_text: String,
    /// The conversation id the message landed in.
    ///
    /// Differs from the id passed to `send` exactly when the backend created
    /// a fresh conversation for a message sent without one.
    pub session_id: String,
}

/// An abstract client for the authoritative remote conversation store.
///
/// This trait defines the contract for listing, reading, and mutating
/// conversations remotely, decoupling the synchronization logic from the
/// concrete transport (HTTP adapter, in-memory fake).
#[async_trait]
pub trait RemoteConversationClient: Send + Sync {
    /// Lists all conversations known to the remote store.
    async fn list(&self) -> Result<Vec<RemoteSessionSummary>>;

    /// Creates a new remote conversation with the given title.
    ///
    /// Usually invoked implicitly by [`send`](Self::send) when no
    /// conversation id is supplied; exposed for callers that need an id
    /// before the first message.
    async fn create(&self, title: &str) -> Result<RemoteSessionSummary>;

    /// Fetches the full message history of a conversation.
    async fn get_messages(&self, session_id: &str) -> Result<Vec<RemoteMessage>>;

    /// Sends a message and returns the assistant's reply.
    ///
    /// Passing `None` for `session_id` asks the backend to create a fresh
    /// conversation; the assigned id comes back in the outcome.
    async fn send(
        &self,
        session_id: Option<&str>,
        text: &str,
        attachment: Option<&AttachmentRef>,
    ) -> Result<SendOutcome>;

    /// Deletes a conversation from the remote store.
    async fn delete(&self, session_id: &str) -> Result<()>;
}
