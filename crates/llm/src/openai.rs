//! Client for OpenAI-compatible chat completion endpoints.
//!
//! Together AI serves the original crew's models through this wire format,
//! so the default base URL points there. Any `/chat/completions`-shaped
//! endpoint works by overriding `api_url`.

use async_trait::async_trait;
use byline_common::{BylineError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{ChatMessage, CompletionClient, CompletionRequest, CompletionResponse, Role, Usage};

const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize, Debug)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    model: String,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireReply {
    content: String,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct OpenAiCompatClient {
    base_url: String,
    model: String,
    api_key: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
    http_client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: Option<String>,
        model: String,
        api_key: String,
        default_temperature: Option<f32>,
        default_max_tokens: Option<u32>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            default_temperature,
            default_max_tokens,
            http_client: reqwest::Client::new(),
        }
    }

    fn wire_role(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> WireRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(ref system) = request.system_prompt {
            messages.push(WireMessage {
                role: "system",
                content: system.clone(),
            });
        }
        for ChatMessage { role, content } in &request.messages {
            messages.push(WireMessage {
                role: Self::wire_role(*role),
                content: content.clone(),
            });
        }
        WireRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature.or(self.default_temperature),
            max_tokens: request
                .max_tokens
                .or(self.default_max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(&request);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BylineError::Backend(format!("chat completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(BylineError::Backend(format!(
                "chat completion endpoint returned {status}: {body_text}"
            )));
        }

        let wire: WireResponse = response.json().await.map_err(|e| {
            BylineError::Backend(format!("malformed chat completion response: {e}"))
        })?;

        let choice = wire.choices.into_iter().next().ok_or_else(|| {
            BylineError::Backend("chat completion response had no choices".to_string())
        })?;

        Ok(CompletionResponse {
            content: choice.message.content,
            model: wire.model,
            usage: wire.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
