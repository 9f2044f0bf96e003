//! Generic role agent backed by a model binding.

use std::sync::Arc;

use async_trait::async_trait;
use byline_common::Result;
use byline_llm::{ChatMessage, CompletionClient, CompletionRequest};
use tracing::{debug, info};

use crate::search::CapabilityTool;
use crate::traits::{Agent, PromptContext, RoleProfile};

/// An agent with a fixed persona, one model binding, and optional
/// capability tools. Immutable during a pipeline run; safe to share
/// across concurrent runs.
pub struct RoleAgent {
    id: String,
    name: String,
    binding: Arc<dyn CompletionClient>,
    system_prompt: String,
    tools: Vec<Arc<dyn CapabilityTool>>,
    verbose: bool,
}

impl RoleAgent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        binding: Arc<dyn CompletionClient>,
        profile: RoleProfile,
    ) -> Self {
        let name = name.into();
        let system_prompt = compose_system_prompt(&name, &profile);
        Self {
            id: id.into(),
            name,
            binding,
            system_prompt,
            tools: Vec::new(),
            verbose: false,
        }
    }

    /// Attach a capability tool. Tools run before the model call, in the
    /// order they were attached.
    pub fn with_tool(mut self, tool: Arc<dyn CapabilityTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    pub fn model_name(&self) -> &str {
        self.binding.model_name()
    }
}

fn compose_system_prompt(name: &str, profile: &RoleProfile) -> String {
    format!(
        "You are {}.\n\nYour goal: {}\n\nBackground: {}",
        name, profile.goal, profile.backstory
    )
}

#[async_trait]
impl Agent for RoleAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    async fn invoke(&self, context: &PromptContext) -> Result<String> {
        let mut prompt = context.prompt.clone();

        // Tool output joins the prompt context before the model call.
        for tool in &self.tools {
            debug!(agent = %self.id, tool = tool.name(), query = %context.query, "Invoking capability tool");
            let output = tool.invoke(&context.query).await?;
            prompt.push_str(&format!("\n\n--- {} results ---\n{}", tool.name(), output));
        }

        let request = CompletionRequest {
            system_prompt: Some(self.system_prompt.clone()),
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
            max_tokens: None,
        };

        let response = self.binding.complete(request).await?;

        if self.verbose {
            info!(
                agent = %self.id,
                model = %response.model,
                output_len = response.content.len(),
                "Agent produced output"
            );
        }

        Ok(response.content)
    }
}
