//! Client for the Anthropic messages endpoint.

use async_trait::async_trait;
use byline_common::{BylineError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{CompletionClient, CompletionRequest, CompletionResponse, Role, Usage};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<WireBlock>,
    model: String,
    usage: Option<WireUsage>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

pub struct AnthropicClient {
    model: String,
    api_key: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(
        model: String,
        api_key: String,
        default_temperature: Option<f32>,
        default_max_tokens: Option<u32>,
    ) -> Self {
        Self {
            model,
            api_key,
            default_temperature,
            default_max_tokens,
            http_client: reqwest::Client::new(),
        }
    }

    fn build_body(&self, request: &CompletionRequest) -> WireRequest {
        // System turns live in the top-level `system` field, never in the
        // message list.
        let messages = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| WireMessage {
                role: match m.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                },
                content: m.content.clone(),
            })
            .collect();

        WireRequest {
            model: self.model.clone(),
            messages,
            system: request.system_prompt.clone(),
            temperature: request.temperature.or(self.default_temperature),
            max_tokens: request
                .max_tokens
                .or(self.default_max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_body(&request);

        let response = self
            .http_client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BylineError::Backend(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(BylineError::Backend(format!(
                "Anthropic API returned {status}: {body_text}"
            )));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| BylineError::Backend(format!("malformed Anthropic response: {e}")))?;

        let content = wire
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            content,
            model: wire.model,
            usage: wire.usage.map(|u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
            finish_reason: wire.stop_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
