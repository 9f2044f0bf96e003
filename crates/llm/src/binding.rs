//! Binding construction: turn a typed config into a completion client.

use std::sync::Arc;

use async_trait::async_trait;
use byline_common::{BylineError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anthropic::AnthropicClient;
use crate::client::{CompletionClient, CompletionRequest, CompletionResponse};
use crate::openai::OpenAiCompatClient;
use crate::retry::{RetryPolicy, RetryingClient};

/// Configuration for one model binding. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Backend wire format: "openai" (OpenAI-compatible, incl. Together AI)
    /// or "anthropic".
    pub provider: String,

    /// Model identifier sent to the backend.
    pub model: String,

    /// Endpoint override. Defaults to the provider's standard URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Inline credential. Prefer `api_key_env` so keys stay out of files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable to read the credential from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Whether the backend should be asked for a streamed transport.
    /// Completions are collected into a single buffered response either way.
    #[serde(default)]
    pub stream: bool,

    /// Binding-static sampling temperature, applied when a request leaves
    /// its own temperature unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Cap on in-flight requests through this binding.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_max_in_flight() -> usize {
    2
}

impl BindingConfig {
    /// Resolve the credential: inline key first, then the named environment
    /// variable, then the provider's conventional variables. Fails with a
    /// configuration error so assembly aborts before any network call.
    fn resolve_api_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        let candidates: &[&str] = match self.api_key_env {
            Some(ref name) => return lookup_env(&[name], &self.model),
            None => match self.provider.as_str() {
                "anthropic" => &["ANTHROPIC_API_KEY"],
                _ => &["TOGETHER_API_KEY", "OPENAI_API_KEY"],
            },
        };
        lookup_env(candidates, &self.model)
    }
}

fn lookup_env<S: AsRef<str>>(names: &[S], model: &str) -> Result<String> {
    for name in names {
        if let Ok(value) = std::env::var(name.as_ref()) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    let tried = names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    Err(BylineError::Config(format!(
        "no API key for binding '{model}' (tried: {tried})"
    )))
}

/// Completion client wrapper that caps in-flight requests per binding.
pub struct ThrottledClient {
    inner: Arc<dyn CompletionClient>,
    permits: Arc<tokio::sync::Semaphore>,
}

impl ThrottledClient {
    pub fn new(inner: Arc<dyn CompletionClient>, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(tokio::sync::Semaphore::new(max_in_flight)),
        }
    }
}

#[async_trait]
impl CompletionClient for ThrottledClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| BylineError::Backend(format!("binding semaphore closed: {e}")))?;
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Build the invocation handle for a binding.
///
/// Validates the credential up front and layers retry and throttling around
/// the provider client. The returned handle is immutable and safe to share
/// across agents and concurrent runs.
pub fn build_binding(config: &BindingConfig) -> Result<Arc<dyn CompletionClient>> {
    if config.model.trim().is_empty() {
        return Err(BylineError::Config(
            "binding has an empty model identifier".to_string(),
        ));
    }

    let api_key = config.resolve_api_key()?;

    if config.stream {
        debug!(
            model = %config.model,
            "streamed transport requested; completions are buffered"
        );
    }

    let base: Box<dyn CompletionClient> = match config.provider.as_str() {
        "openai" => Box::new(OpenAiCompatClient::new(
            config.api_url.clone(),
            config.model.clone(),
            api_key,
            config.temperature,
            config.max_tokens,
        )),
        "anthropic" => Box::new(AnthropicClient::new(
            config.model.clone(),
            api_key,
            config.temperature,
            config.max_tokens,
        )),
        other => {
            return Err(BylineError::Config(format!(
                "unknown binding provider: {other}"
            )));
        }
    };

    let retrying: Box<dyn CompletionClient> =
        Box::new(RetryingClient::new(base, config.retry.clone()));

    Ok(Arc::new(ThrottledClient::new(
        Arc::from(retrying),
        config.max_in_flight,
    )))
}
