//! Crew assembly: typed configuration and explicit pipeline construction.
//!
//! Everything is validated here, at assembly time. A crew that builds
//! successfully has resolved every credential and rendered every persona;
//! the first network call happens inside a pipeline run, never before.

use std::sync::Arc;

use byline_common::{BylineError, Result};
use byline_llm::{build_binding, BindingConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pipeline::{Pipeline, TaskSpec};
use crate::role::RoleAgent;
use crate::search::SerperSearchTool;
use crate::traits::RoleProfile;
use crate::{editor, planner, writer};

/// Configuration for the three-role article crew.
///
/// The defaults reproduce the stock crew: a Llama scout planner with web
/// search, a Qwen writer, and a Gemma editor, all served through the
/// Together AI endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewConfig {
    #[serde(default = "default_planner")]
    pub planner: RoleSection,

    #[serde(default = "default_writer")]
    pub writer: RoleSection,

    #[serde(default = "default_editor")]
    pub editor: RoleSection,

    /// Web search tool for the planner. Omit the section to run without
    /// search augmentation.
    #[serde(default = "default_search")]
    pub search: Option<SearchConfig>,

    /// Emit per-agent output logs during runs.
    #[serde(default)]
    pub verbose: bool,
}

/// Configuration for one role: its model binding, persona, and stage task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSection {
    pub binding: BindingConfig,
    pub goal: String,
    pub backstory: String,
    pub task: TaskSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSection {
    pub description: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Inline Serper API key; falls back to `SERPER_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    10
}

fn together_binding(model: &str, stream: bool) -> BindingConfig {
    BindingConfig {
        provider: "openai".to_string(),
        model: model.to_string(),
        api_url: None,
        api_key: None,
        api_key_env: None,
        stream,
        temperature: None,
        max_tokens: None,
        max_in_flight: 2,
        retry: RetryPolicy::default(),
    }
}

fn role_section(
    model: &str,
    stream: bool,
    profile: RoleProfile,
    task: TaskSpec,
) -> RoleSection {
    RoleSection {
        binding: together_binding(model, stream),
        goal: profile.goal,
        backstory: profile.backstory,
        task: TaskSection {
            description: task.description,
            expected_output: task.expected_output,
        },
    }
}

fn default_planner() -> RoleSection {
    role_section(
        planner::PLANNER_MODEL,
        true,
        planner::default_profile(),
        planner::default_task(),
    )
}

fn default_writer() -> RoleSection {
    role_section(
        writer::WRITER_MODEL,
        true,
        writer::default_profile(),
        writer::default_task(),
    )
}

fn default_editor() -> RoleSection {
    role_section(
        editor::EDITOR_MODEL,
        false,
        editor::default_profile(),
        editor::default_task(),
    )
}

fn default_search() -> Option<SearchConfig> {
    Some(SearchConfig {
        api_key: None,
        max_results: default_max_results(),
    })
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            planner: default_planner(),
            writer: default_writer(),
            editor: default_editor(),
            search: default_search(),
            verbose: false,
        }
    }
}

impl CrewConfig {
    /// Load a crew configuration from a TOML file. Missing sections fall
    /// back to the stock crew.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: CrewConfig = toml::from_str(&raw).map_err(|e| {
            BylineError::Config(format!(
                "failed to parse {}: {e}",
                path.as_ref().display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on malformed role or task configuration.
    pub fn validate(&self) -> Result<()> {
        for (role, section) in [
            ("planner", &self.planner),
            ("writer", &self.writer),
            ("editor", &self.editor),
        ] {
            if section.goal.trim().is_empty() {
                return Err(BylineError::Config(format!("{role} has an empty goal")));
            }
            if section.backstory.trim().is_empty() {
                return Err(BylineError::Config(format!(
                    "{role} has an empty backstory"
                )));
            }
            if section.task.description.trim().is_empty() {
                return Err(BylineError::Config(format!(
                    "{role} has an empty task description"
                )));
            }
            if section.task.expected_output.trim().is_empty() {
                return Err(BylineError::Config(format!(
                    "{role} has an empty expected output"
                )));
            }
        }
        if !self.planner.task.description.contains("{topic}") {
            return Err(BylineError::Config(
                "planner task description must contain the {topic} placeholder".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_search_key(config: &SearchConfig) -> Result<String> {
    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }
    match std::env::var("SERPER_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(BylineError::Config(
            "web search enabled but no Serper API key found (set SERPER_API_KEY)".to_string(),
        )),
    }
}

fn build_role(
    id: &str,
    name: &str,
    section: &RoleSection,
    verbose: bool,
) -> Result<RoleAgent> {
    let binding = build_binding(&section.binding)?;
    let profile = RoleProfile {
        goal: section.goal.clone(),
        backstory: section.backstory.clone(),
    };
    Ok(RoleAgent::new(id, name, binding, profile).verbose(verbose))
}

fn task_spec(name: &str, section: &RoleSection) -> TaskSpec {
    TaskSpec {
        name: name.to_string(),
        description: section.task.description.clone(),
        expected_output: section.task.expected_output.clone(),
    }
}

/// Assemble the plan → write → edit pipeline from a validated config.
///
/// All configuration errors (missing credentials included) surface here,
/// before any network call.
pub fn build_crew(config: &CrewConfig) -> Result<Pipeline> {
    config.validate()?;

    let mut planner_agent = build_role(
        "planner",
        "Content Planner",
        &config.planner,
        config.verbose,
    )?;
    if let Some(ref search) = config.search {
        let key = resolve_search_key(search)?;
        planner_agent = planner_agent
            .with_tool(Arc::new(SerperSearchTool::new(key, search.max_results)));
    }

    let writer_agent = build_role("writer", "Content Writer", &config.writer, config.verbose)?;
    let editor_agent = build_role("editor", "Content Editor", &config.editor, config.verbose)?;

    info!(
        planner_model = %config.planner.binding.model,
        writer_model = %config.writer.binding.model,
        editor_model = %config.editor.binding.model,
        search = config.search.is_some(),
        "Assembling article crew"
    );

    Pipeline::builder("article-crew")
        .add_stage(task_spec("plan", &config.planner), Arc::new(planner_agent))
        .add_stage(task_spec("write", &config.writer), Arc::new(writer_agent))
        .add_stage(task_spec("edit", &config.editor), Arc::new(editor_agent))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_the_stock_crew() {
        let config = CrewConfig::default();
        assert_eq!(config.planner.binding.model, planner::PLANNER_MODEL);
        assert_eq!(config.writer.binding.model, writer::WRITER_MODEL);
        assert_eq!(config.editor.binding.model, editor::EDITOR_MODEL);
        assert!(config.planner.binding.stream);
        assert!(!config.editor.binding.stream);
        assert_eq!(config.search.as_ref().unwrap().max_results, 10);
        config.validate().unwrap();
    }

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let config: CrewConfig = toml::from_str("").unwrap();
        assert_eq!(config.planner.binding.model, planner::PLANNER_MODEL);
        assert!(config.search.is_some());
        assert!(!config.verbose);
    }

    #[test]
    fn partial_toml_overrides_one_role() {
        let config: CrewConfig = toml::from_str(
            r#"
verbose = true

[editor]
goal = "Edit ruthlessly"
backstory = "A veteran copy editor"

[editor.binding]
provider = "anthropic"
model = "claude-sonnet-4-20250514"

[editor.task]
description = "Edit the draft about {topic}."
expected_output = "A clean final article."
"#,
        )
        .unwrap();
        assert!(config.verbose);
        assert_eq!(config.editor.binding.provider, "anthropic");
        assert_eq!(config.editor.goal, "Edit ruthlessly");
        // Untouched roles keep their defaults.
        assert_eq!(config.writer.binding.model, writer::WRITER_MODEL);
        config.validate().unwrap();
    }

    #[test]
    fn validation_rejects_blank_goal() {
        let mut config = CrewConfig::default();
        config.writer.goal = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("writer has an empty goal"));
    }

    #[test]
    fn validation_requires_topic_placeholder_in_plan() {
        let mut config = CrewConfig::default();
        config.planner.task.description = "Plan something interesting.".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{topic}"));
    }

    #[test]
    fn missing_binding_credential_fails_assembly() {
        let mut config = CrewConfig::default();
        config.search = None;
        // Guaranteed-absent variable so the test ignores the ambient env.
        for section in [
            &mut config.planner,
            &mut config.writer,
            &mut config.editor,
        ] {
            section.binding.api_key_env = Some("BYLINE_TEST_ABSENT_KEY".to_string());
        }
        assert!(matches!(
            build_crew(&config),
            Err(BylineError::Config(_))
        ));
    }

    #[test]
    fn missing_search_key_fails_assembly() {
        let mut config = CrewConfig::default();
        for section in [
            &mut config.planner,
            &mut config.writer,
            &mut config.editor,
        ] {
            section.binding.api_key = Some("tok-test".to_string());
        }
        config.search = Some(SearchConfig {
            api_key: None,
            max_results: 5,
        });
        // Only meaningful when SERPER_API_KEY is not set in the ambient
        // environment; inline keys make the other bindings pass.
        if std::env::var("SERPER_API_KEY").is_err() {
            assert!(matches!(build_crew(&config), Err(BylineError::Config(_))));
        }
    }

    #[test]
    fn crew_builds_with_inline_keys() {
        let mut config = CrewConfig::default();
        for section in [
            &mut config.planner,
            &mut config.writer,
            &mut config.editor,
        ] {
            section.binding.api_key = Some("tok-test".to_string());
        }
        config.search = Some(SearchConfig {
            api_key: Some("serper-test".to_string()),
            max_results: 5,
        });

        let pipeline = build_crew(&config).unwrap();
        assert_eq!(pipeline.name(), "article-crew");
        assert_eq!(pipeline.stage_count(), 3);
    }

    #[test]
    fn two_crews_from_one_config_are_independent() {
        let mut config = CrewConfig::default();
        for section in [
            &mut config.planner,
            &mut config.writer,
            &mut config.editor,
        ] {
            section.binding.api_key = Some("tok-test".to_string());
        }
        config.search = None;

        let first = build_crew(&config).unwrap();
        let second = build_crew(&config).unwrap();
        assert_eq!(first.stage_count(), second.stage_count());
    }
}
