//! Completion client trait and the chat types it exchanges.

use async_trait::async_trait;
use byline_common::Result;
use serde::{Deserialize, Serialize};

/// Sender of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of conversation sent to a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A buffered completion request.
///
/// `temperature` and `max_tokens` left unset fall back to the binding's
/// static values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Token accounting reported by a backend, when available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// The text produced by a backend for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

/// A handle onto one backend model endpoint.
///
/// Implementations issue exactly one HTTPS round trip per `complete` call;
/// retries and concurrency limits are layered on by wrappers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl CompletionClient for Box<dyn CompletionClient> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn request_roundtrips_through_json() {
        let request = CompletionRequest {
            system_prompt: Some("You are an editor.".to_string()),
            messages: vec![ChatMessage::user("Polish this draft.")],
            temperature: Some(0.4),
            max_tokens: Some(2048),
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: CompletionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.system_prompt.as_deref(), Some("You are an editor."));
        assert_eq!(back.messages.len(), 1);
        assert_eq!(back.messages[0].role, Role::User);
        assert_eq!(back.temperature, Some(0.4));
        assert_eq!(back.max_tokens, Some(2048));
    }

    #[test]
    fn response_roundtrips_through_json() {
        let response = CompletionResponse {
            content: "Final article".to_string(),
            model: "google/gemma-2-27b-it".to_string(),
            usage: Some(Usage {
                prompt_tokens: 120,
                completion_tokens: 480,
            }),
            finish_reason: Some("stop".to_string()),
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: CompletionResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "Final article");
        let usage = back.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.completion_tokens, 480);
    }
}
