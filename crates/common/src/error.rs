//! Error taxonomy for byline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BylineError {
    /// Missing credential or malformed role/task configuration.
    /// Raised during assembly, before any stage executes.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A model or tool call failed (network, quota, malformed response).
    /// Aborts the pipeline run at the current stage.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid caller input, rejected before pipeline kickoff.
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BylineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_non_empty() {
        let errors = vec![
            BylineError::Config("missing api key".into()),
            BylineError::Backend("502 bad gateway".into()),
            BylineError::Input("empty topic".into()),
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn config_error_names_the_problem() {
        let err = BylineError::Config("planner binding has no API key".into());
        assert!(err.to_string().contains("planner binding has no API key"));
    }
}
