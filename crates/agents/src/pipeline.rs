//! Sequential stage pipeline.
//!
//! Stages execute strictly in the declared order, never concurrently and
//! never skipped. Stage 0 receives only the topic; every later stage
//! receives the previous stage's output verbatim as its input. The first
//! failure aborts the run: later stages are never invoked and no partial
//! artifact is surfaced.

use std::sync::Arc;
use std::time::Instant;

use byline_common::{BylineError, Result};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::traits::{Agent, PromptContext};

/// Static configuration for one stage task. The description may contain a
/// `{topic}` placeholder, substituted at run time.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub expected_output: String,
}

impl TaskSpec {
    fn render(&self, topic: &str, input: Option<&str>) -> String {
        let mut prompt = self.description.replace("{topic}", topic);
        if !self.expected_output.is_empty() {
            prompt.push_str("\n\nExpected output: ");
            prompt.push_str(&self.expected_output);
        }
        if let Some(input) = input {
            prompt.push_str("\n\n--- Input from the previous stage ---\n");
            prompt.push_str(input);
        }
        prompt
    }
}

/// One step of the pipeline, bound to exactly one agent.
pub struct StageTask {
    spec: TaskSpec,
    agent: Arc<dyn Agent>,
}

impl StageTask {
    pub fn new(spec: TaskSpec, agent: Arc<dyn Agent>) -> Self {
        Self { spec, agent }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn agent_id(&self) -> &str {
        self.agent.id()
    }

    /// Render the prompt from the static spec plus the input and delegate
    /// to the bound agent. Errors propagate unchanged.
    pub async fn execute(&self, topic: &str, input: Option<&str>) -> Result<String> {
        let context = PromptContext::new(self.spec.render(topic, input), topic);
        self.agent.invoke(&context).await
    }
}

/// Output record for one completed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    pub stage: String,
    pub agent_id: String,
    pub output: String,
    pub duration_ms: u64,
}

/// The final product of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub run_id: String,
    pub topic: String,
    /// The last stage's output, verbatim.
    pub raw: String,
    pub stages: Vec<StageOutput>,
    pub duration_ms: u64,
}

/// Builder that registers stages in order and validates the assembly.
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageTask>,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    pub fn add_stage(mut self, spec: TaskSpec, agent: Arc<dyn Agent>) -> Self {
        self.stages.push(StageTask::new(spec, agent));
        self
    }

    /// Validate the assembly. Fails fast on an empty pipeline or blank
    /// stage configuration, before anything runs.
    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(BylineError::Config(format!(
                "pipeline '{}' has no stages",
                self.name
            )));
        }
        for stage in &self.stages {
            if stage.spec.name.trim().is_empty() {
                return Err(BylineError::Config(format!(
                    "pipeline '{}' has a stage with an empty name",
                    self.name
                )));
            }
            if stage.spec.description.trim().is_empty() {
                return Err(BylineError::Config(format!(
                    "stage '{}' has an empty task description",
                    stage.spec.name
                )));
            }
        }
        Ok(Pipeline {
            name: self.name,
            stages: self.stages,
        })
    }
}

/// An ordered crew of stage tasks executed one after another.
pub struct Pipeline {
    name: String,
    stages: Vec<StageTask>,
}

impl Pipeline {
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Execute all stages for one topic and return the final artifact.
    ///
    /// Rejects an empty topic before any stage runs. Aborts on the first
    /// stage failure with the stage name attached to the error.
    pub async fn run(&self, topic: &str) -> Result<Artifact> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(BylineError::Input("topic must not be empty".to_string()));
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let start = Instant::now();

        info!(
            pipeline = %self.name,
            run_id = %run_id,
            topic,
            stages = self.stages.len(),
            "Starting pipeline run"
        );

        let mut records: Vec<StageOutput> = Vec::with_capacity(self.stages.len());
        let mut carry: Option<String> = None;

        for (i, stage) in self.stages.iter().enumerate() {
            let stage_start = Instant::now();

            info!(
                pipeline = %self.name,
                run_id = %run_id,
                stage = stage.name(),
                step = i + 1,
                "Executing stage"
            );

            let output = stage
                .execute(topic, carry.as_deref())
                .await
                .map_err(|e| {
                    error!(
                        pipeline = %self.name,
                        run_id = %run_id,
                        stage = stage.name(),
                        error = %e,
                        "Stage failed, aborting run"
                    );
                    attribute_to_stage(stage.name(), e)
                })?;

            debug!(
                pipeline = %self.name,
                run_id = %run_id,
                stage = stage.name(),
                output_len = output.len(),
                duration_ms = stage_start.elapsed().as_millis() as u64,
                "Stage completed"
            );

            records.push(StageOutput {
                stage: stage.name().to_string(),
                agent_id: stage.agent_id().to_string(),
                output: output.clone(),
                duration_ms: stage_start.elapsed().as_millis() as u64,
            });
            carry = Some(output);
        }

        // The builder guarantees at least one stage, so carry is set.
        let raw = carry.unwrap_or_default();

        info!(
            pipeline = %self.name,
            run_id = %run_id,
            stages = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Pipeline run completed"
        );

        Ok(Artifact {
            run_id,
            topic: topic.to_string(),
            raw,
            stages: records,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn attribute_to_stage(stage: &str, error: BylineError) -> BylineError {
    match error {
        BylineError::Backend(msg) => BylineError::Backend(format!("stage '{stage}': {msg}")),
        other => other,
    }
}
