//! Writer role - drafting the article from the content plan.

use crate::pipeline::TaskSpec;
use crate::traits::RoleProfile;

pub const WRITER_MODEL: &str = "Qwen/Qwen3-235B-A22B-fp8-tput";

pub const WRITER_GOAL: &str =
    "Write an insightful, factually grounded article based on the content plan";

pub const WRITER_BACKSTORY: &str = "You are a professional writer known for \
clear, opinionated long-form pieces. You follow the content plan you are \
given, acknowledge when a statement is opinion rather than fact, and never \
pad the text to hit a word count.";

pub const WRITE_TASK: &str = "Use the content plan to craft a compelling \
article about {topic}. Incorporate the SEO keywords naturally. Structure the \
piece with an engaging introduction, an insightful body, and a summarizing \
conclusion.";

pub const WRITE_EXPECTED_OUTPUT: &str = "A well-written article in markdown \
format, ready for publication, with each section carrying two or three \
paragraphs.";

pub fn default_profile() -> RoleProfile {
    RoleProfile {
        goal: WRITER_GOAL.to_string(),
        backstory: WRITER_BACKSTORY.to_string(),
    }
}

pub fn default_task() -> TaskSpec {
    TaskSpec {
        name: "write".to_string(),
        description: WRITE_TASK.to_string(),
        expected_output: WRITE_EXPECTED_OUTPUT.to_string(),
    }
}
