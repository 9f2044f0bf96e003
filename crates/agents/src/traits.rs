//! Core agent trait and role configuration.

use async_trait::async_trait;
use byline_common::Result;
use serde::{Deserialize, Serialize};

/// Static persona configuration for a role agent.
///
/// Fixed at assembly time; never changes during a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleProfile {
    /// What the role is trying to achieve.
    pub goal: String,
    /// Persona text that frames how the role approaches its work.
    pub backstory: String,
}

/// The prompt context handed to an agent for one invocation.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Fully rendered task instructions for the model.
    pub prompt: String,
    /// Short form of the request, used as the query for capability tools.
    pub query: String,
}

impl PromptContext {
    pub fn new(prompt: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            query: query.into(),
        }
    }
}

/// A pipeline participant with a fixed persona and model binding.
///
/// One invocation issues at most one model call, preceded by zero or more
/// capability tool calls whose output joins the prompt context.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier, used in logs and stage records.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// The system prompt composed from the role profile.
    fn system_prompt(&self) -> &str;

    /// Produce text for the given prompt context. Backend failures
    /// propagate unchanged; there is no local recovery.
    async fn invoke(&self, context: &PromptContext) -> Result<String>;
}
