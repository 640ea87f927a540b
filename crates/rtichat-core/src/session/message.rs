//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including the sender side, attachment references, and the message itself.

use serde::{Deserialize, Serialize};

/// Represents which side of the conversation produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Message produced by the assistant.
    Assistant,
}

/// Reference to a file attached to a message.
///
/// Only the metadata travels with the message; uploading the payload is the
/// remote client's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Original file name as shown to the user.
    pub name: String,
    /// MIME type of the attached file.
    pub mime_type: String,
}

/// A single message in a conversation history.
///
/// Messages are immutable once created, with one exception: an assistant
/// message's `text` may be replaced in place by the explicit edit operation.
/// User messages are never editable. The `id` is generated locally at
/// creation time and is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format, generated locally).
    pub id: String,
    /// Which side of the conversation produced this message.
    pub sender: Sender,
    /// The message content.
    pub text: String,
    /// Optional attachment reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
    /// Timestamp when the message was created (RFC 3339 format).
    pub created_at: String,
    /// True for synthetic failure notices appended when a send fails.
    #[serde(default)]
    pub error: bool,
}

impl Message {
    /// Creates a new user message with an optional attachment.
    pub fn user(text: impl Into<String>, attachment: Option<AttachmentRef>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: Sender::User,
            text: text.into(),
            attachment,
            created_at: chrono::Utc::now().to_rfc3339(),
            error: false,
        }
    }

    /// Creates a new assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: Sender::Assistant,
            text: text.into(),
            attachment: None,
            created_at: chrono::Utc::now().to_rfc3339(),
            error: false,
        }
    }

    /// Creates a synthetic assistant message flagged as a failure notice.
    ///
    /// Appended in place of a real reply when a send fails, so the failure
    /// stays visible in the conversation instead of disappearing.
    pub fn error_notice(text: impl Into<String>) -> Self {
        Self {
            error: true,
            ..Self::assistant(text)
        }
    }

    /// Creates a message from parts received from the remote store.
    ///
    /// Remote messages carry their own timestamps; a fresh local id is
    /// assigned since remote ids are not tracked per message.
    pub fn from_remote(sender: Sender, text: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            attachment: None,
            created_at: created_at.into(),
            error: false,
        }
    }
}
