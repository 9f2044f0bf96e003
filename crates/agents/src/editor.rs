//! Editor role - final polish of the drafted article.

use crate::pipeline::TaskSpec;
use crate::traits::RoleProfile;

pub const EDITOR_MODEL: &str = "google/gemma-2-27b-it";

pub const EDITOR_GOAL: &str =
    "Edit the draft article so it is polished, correct, and publication-ready";

pub const EDITOR_BACKSTORY: &str = "You are an editor with a sharp eye for \
grammar, flow, and house style. You tighten prose without changing its \
meaning and keep the writer's voice intact.";

pub const EDIT_TASK: &str = "Proofread the draft article about {topic} for \
grammatical errors, awkward phrasing, and structural issues. Ensure it \
follows journalistic best practices and keep the markdown formatting.";

pub const EDIT_EXPECTED_OUTPUT: &str =
    "A polished, publication-ready article in markdown format.";

pub fn default_profile() -> RoleProfile {
    RoleProfile {
        goal: EDITOR_GOAL.to_string(),
        backstory: EDITOR_BACKSTORY.to_string(),
    }
}

pub fn default_task() -> TaskSpec {
    TaskSpec {
        name: "edit".to_string(),
        description: EDIT_TASK.to_string(),
        expected_output: EDIT_EXPECTED_OUTPUT.to_string(),
    }
}
