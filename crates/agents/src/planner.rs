//! Planner role - topic research and content outlining.
//!
//! First stage of the crew. Bound to the Llama scout model by default and
//! the only role that carries the web search capability tool.

use crate::pipeline::TaskSpec;
use crate::traits::RoleProfile;

pub const PLANNER_MODEL: &str = "meta-llama/Llama-4-Scout-17B-16E-Instruct";

pub const PLANNER_GOAL: &str =
    "Plan engaging and factually accurate content about the requested topic";

pub const PLANNER_BACKSTORY: &str = "You are an experienced content strategist. \
You research current trends and authoritative sources, identify what the target \
audience actually needs to know, and turn that into a structured content plan \
other writers can execute without guesswork.";

pub const PLAN_TASK: &str = "Research current trends, key players, and noteworthy \
news about {topic}. Identify the target audience, their interests, and pain \
points. Develop a detailed content outline with an introduction, key sections, \
and a call to action, and include relevant SEO keywords and sources.";

pub const PLAN_EXPECTED_OUTPUT: &str = "A comprehensive content plan document \
with an outline, audience analysis, SEO keywords, and sources.";

pub fn default_profile() -> RoleProfile {
    RoleProfile {
        goal: PLANNER_GOAL.to_string(),
        backstory: PLANNER_BACKSTORY.to_string(),
    }
}

pub fn default_task() -> TaskSpec {
    TaskSpec {
        name: "plan".to_string(),
        description: PLAN_TASK.to_string(),
        expected_output: PLAN_EXPECTED_OUTPUT.to_string(),
    }
}
