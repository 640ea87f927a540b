//! HTTP adapter for the authoritative conversation store.
//!
//! Implements [`RemoteConversationClient`] against the backend REST API.
//! List, history, and delete endpoints answer inside a
//! `{success, message, data}` envelope; the send endpoint answers with the
//! chat response body directly.

use crate::config::RemoteConfig;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use rtichat_core::error::{ChatError, Result};
use rtichat_core::remote::{
    RemoteConversationClient, RemoteMessage, RemoteSessionSummary, SendOutcome,
};
use rtichat_core::session::{AttachmentRef, Sender};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conversation client talking to the backend over HTTP.
#[derive(Clone)]
pub struct HttpConversationClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    user_id: Option<String>,
}

impl HttpConversationClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            user_id: config.user_id.clone(),
        })
    }

    /// Creates a client from the on-disk configuration.
    pub fn from_config_file() -> Result<Self> {
        Self::new(&RemoteConfig::load()?)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and maps transport failures to `NetworkFailure`.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|e| ChatError::network_failure(format!("Request failed: {e}")))
    }

    /// Decodes an enveloped response, requiring the data payload.
    async fn read_envelope<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let envelope = self.read_envelope_raw::<T>(response).await?;
        envelope
            .data
            .ok_or_else(|| ChatError::remote_rejection(None, "Response carried no data"))
    }

    async fn read_envelope_raw<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            ChatError::remote_rejection(Some(status.as_u16()), format!("Malformed response: {e}"))
        })?;

        if !envelope.success {
            return Err(ChatError::remote_rejection(None, envelope.message.clone()));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl RemoteConversationClient for HttpConversationClient {
    async fn list(&self) -> Result<Vec<RemoteSessionSummary>> {
        let response = self
            .dispatch(self.request(Method::GET, "/chat/conversations"))
            .await?;
        let conversations: Vec<ConversationDto> = self.read_envelope(response).await?;
        Ok(conversations.iter().map(summary_from).collect())
    }

    async fn create(&self, title: &str) -> Result<RemoteSessionSummary> {
        let response = self
            .dispatch(
                self.request(Method::POST, "/chat/conversations")
                    .json(&CreateConversationRequest { title }),
            )
            .await?;
        let conversation: ConversationDto = self.read_envelope(response).await?;
        Ok(summary_from(&conversation))
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<RemoteMessage>> {
        let path = format!("/chat/conversations/{session_id}/messages");
        let response = self.dispatch(self.request(Method::GET, &path)).await?;
        let messages: Vec<MessageDto> = self.read_envelope(response).await?;
        Ok(messages.iter().map(message_from).collect())
    }

    async fn send(
        &self,
        session_id: Option<&str>,
        text: &str,
        attachment: Option<&AttachmentRef>,
    ) -> Result<SendOutcome> {
        let request = ChatSendRequest {
            message: text,
            conversation_id: session_id,
            user_id: self.user_id.as_deref(),
            attachment: attachment.map(|a| AttachmentDto {
                name: &a.name,
                mime_type: &a.mime_type,
            }),
        };

        let response = self
            .dispatch(self.request(Method::POST, "/chat/send").json(&request))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let reply: ChatSendResponse = response.json().await.map_err(|e| {
            ChatError::remote_rejection(Some(status.as_u16()), format!("Malformed response: {e}"))
        })?;

        Ok(SendOutcome {
            assistant_text: reply.message,
            session_id: reply.conversation_id,
        })
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let path = format!("/chat/conversations/{session_id}");
        let response = self.dispatch(self.request(Method::DELETE, &path)).await?;
        self.read_envelope_raw::<serde_json::Value>(response)
            .await?;
        Ok(())
    }
}

// ============================================================================
// Wire DTOs
// ============================================================================

/// Standard response envelope used by most backend endpoints.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ConversationDto {
    id: String,
    title: String,
    updated_at: String,
    #[serde(default)]
    message_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MessageDto {
    sender: String,
    content: String,
    created_at: String,
}

#[derive(Serialize)]
struct CreateConversationRequest<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct ChatSendRequest<'a> {
    message: &'a str,
    // Always serialized; `null` asks the backend for a fresh conversation.
    conversation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<AttachmentDto<'a>>,
}

#[derive(Serialize)]
struct AttachmentDto<'a> {
    name: &'a str,
    mime_type: &'a str,
}

/// The send endpoint answers outside the envelope.
#[derive(Debug, Deserialize)]
struct ChatSendResponse {
    message: String,
    conversation_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn summary_from(dto: &ConversationDto) -> RemoteSessionSummary {
    RemoteSessionSummary {
        id: dto.id.clone(),
        title: dto.title.clone(),
        updated_at: dto.updated_at.clone(),
        message_count: dto.message_count,
    }
}

fn message_from(dto: &MessageDto) -> RemoteMessage {
    // The backend labels assistant messages "bot".
    let sender = if dto.sender == "user" {
        Sender::User
    } else {
        Sender::Assistant
    };
    RemoteMessage {
        sender,
        text: dto.content.clone(),
        created_at: dto.created_at.clone(),
    }
}

fn map_http_error(status: StatusCode, body: String) -> ChatError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|e| e.detail.or(e.message))
        .unwrap_or(body);
    ChatError::remote_rejection(Some(status.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_false_is_a_rejection() {
        let envelope: ApiEnvelope<Vec<ConversationDto>> = serde_json::from_str(
            r#"{"success": false, "message": "Database unavailable", "data": null}"#,
        )
        .unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.message, "Database unavailable");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn conversation_dto_maps_to_summary() {
        let dto: ConversationDto = serde_json::from_str(
            r#"{
                "id": "c-42",
                "user_id": "u-1",
                "title": "Passport RTI",
                "created_at": "2025-05-01T10:00:00+00:00",
                "updated_at": "2025-05-02T10:00:00+00:00",
                "message_count": 6
            }"#,
        )
        .unwrap();

        let summary = summary_from(&dto);
        assert_eq!(summary.id, "c-42");
        assert_eq!(summary.title, "Passport RTI");
        assert_eq!(summary.message_count, Some(6));
    }

    #[test]
    fn bot_sender_maps_to_assistant() {
        let dto = MessageDto {
            sender: "bot".to_string(),
            content: "RTI is...".to_string(),
            created_at: "2025-05-01T10:00:00+00:00".to_string(),
        };
        assert_eq!(message_from(&dto).sender, Sender::Assistant);

        let dto = MessageDto {
            sender: "user".to_string(),
            content: "What is RTI?".to_string(),
            created_at: "2025-05-01T10:00:01+00:00".to_string(),
        };
        assert_eq!(message_from(&dto).sender, Sender::User);
    }

    #[test]
    fn send_request_serializes_null_conversation_id() {
        let request = ChatSendRequest {
            message: "What is RTI?",
            conversation_id: None,
            user_id: None,
            attachment: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        // Explicit null, not absent: this is how a fresh conversation is requested.
        assert!(json.get("conversation_id").unwrap().is_null());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn http_error_prefers_detail_field() {
        let err = map_http_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "AI service unavailable"}"#.to_string(),
        );

        match err {
            ChatError::RemoteRejection { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "AI service unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn send_response_ignores_extra_fields() {
        let reply: ChatSendResponse = serde_json::from_str(
            r#"{
                "message": "RTI is the Right to Information Act...",
                "conversation_id": "c-42",
                "message_id": "m-7",
                "is_rti_related": true,
                "suggestions": null
            }"#,
        )
        .unwrap();

        assert_eq!(reply.conversation_id, "c-42");
        assert!(reply.message.starts_with("RTI is"));
    }
}
