//! Role agents and the sequential article pipeline.
//!
//! This crate wires three role-specialized agents into a fixed crew:
//!
//! - **Planner**: researches the topic (optionally via web search) and
//!   produces a content outline
//! - **Writer**: turns the outline into a draft article
//! - **Editor**: polishes the draft into the final artifact
//!
//! Each agent is bound to one model binding from `byline-llm`. The stages
//! execute strictly in order, each stage's output feeding the next:
//!
//! ```text
//! topic ──▶ [plan] ──outline──▶ [write] ──draft──▶ [edit] ──▶ article
//! ```
//!
//! Assembly is explicit: [`crew::build_crew`] validates the typed
//! configuration and constructs bindings, agents, and stages before any
//! network call happens.

pub mod crew;
pub mod editor;
pub mod pipeline;
pub mod planner;
pub mod role;
pub mod search;
pub mod traits;
pub mod writer;

pub use crew::{build_crew, CrewConfig, RoleSection, SearchConfig, TaskSection};
pub use pipeline::{Artifact, Pipeline, PipelineBuilder, StageOutput, StageTask, TaskSpec};
pub use role::RoleAgent;
pub use search::{CapabilityTool, SerperSearchTool};
pub use traits::{Agent, PromptContext, RoleProfile};
