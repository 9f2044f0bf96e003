//! Model binding layer for byline.
//!
//! A model binding associates a logical role with a concrete backend
//! endpoint, credential, and sampling parameters. Bindings are built once
//! from a [`BindingConfig`], are immutable afterwards, and are shared
//! read-only across agents as `Arc<dyn CompletionClient>`.
//!
//! The stack produced by [`build_binding`] is:
//!
//! ```text
//! ThrottledClient ── caps in-flight requests per binding
//!   └─ RetryingClient ── backoff on throttling / transient 5xx
//!        └─ provider client (OpenAI-compatible or Anthropic)
//! ```

pub mod anthropic;
pub mod binding;
pub mod client;
pub mod openai;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use binding::{build_binding, BindingConfig, ThrottledClient};
pub use client::{ChatMessage, CompletionClient, CompletionRequest, CompletionResponse, Role, Usage};
pub use openai::OpenAiCompatClient;
pub use retry::{RetryPolicy, RetryingClient};
