//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use byline_common::BylineError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub stages: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        stages: state.pipeline.stage_count(),
    })
}

/// Article generation request body.
#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub topic: String,
}

/// One stage's contribution to the run.
#[derive(Debug, Serialize)]
pub struct StageSummary {
    pub stage: String,
    pub agent: String,
    pub duration_ms: u64,
}

/// Article generation response body.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub topic: String,
    /// Suggested filename for a markdown download of the article.
    pub filename: String,
    pub article: String,
    pub stages: Vec<StageSummary>,
    pub duration_ms: u64,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip)]
    status: StatusCode,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

fn to_error_response(error: BylineError) -> ErrorResponse {
    let (status, code) = match &error {
        BylineError::Input(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        BylineError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        BylineError::Backend(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    };
    ErrorResponse {
        error: error.to_string(),
        code,
        status,
    }
}

/// Suggested download filename for an article about the given topic.
pub fn article_filename(topic: &str) -> String {
    format!("{}_article.md", topic.to_lowercase().replace(' ', "_"))
}

/// Run the full pipeline for a topic and return the finished article.
pub async fn generate_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ArticleRequest>,
) -> Result<Json<ArticleResponse>, ErrorResponse> {
    info!(
        topic_preview = %request.topic.chars().take(50).collect::<String>(),
        "Received article request"
    );

    let artifact = state
        .pipeline
        .run(&request.topic)
        .await
        .map_err(to_error_response)?;

    let stages = artifact
        .stages
        .iter()
        .map(|s| StageSummary {
            stage: s.stage.clone(),
            agent: s.agent_id.clone(),
            duration_ms: s.duration_ms,
        })
        .collect();

    Ok(Json(ArticleResponse {
        filename: article_filename(&artifact.topic),
        topic: artifact.topic,
        article: artifact.raw,
        stages,
        duration_ms: artifact.duration_ms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_follows_download_convention() {
        assert_eq!(
            article_filename("Renewable Energy Policy"),
            "renewable_energy_policy_article.md"
        );
        assert_eq!(article_filename("rust"), "rust_article.md");
    }

    #[test]
    fn article_request_deserializes() {
        let request: ArticleRequest =
            serde_json::from_str(r#"{"topic": "solar power"}"#).unwrap();
        assert_eq!(request.topic, "solar power");
    }

    #[test]
    fn input_error_maps_to_bad_request() {
        let response = to_error_response(BylineError::Input("empty topic".into()));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.code, "INVALID_INPUT");
    }

    #[test]
    fn backend_error_maps_to_bad_gateway() {
        let response = to_error_response(BylineError::Backend("503".into()));
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.code, "BACKEND_ERROR");
        assert!(!response.error.is_empty());
    }

    #[test]
    fn error_body_omits_status_field() {
        let response = to_error_response(BylineError::Config("bad".into()));
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["code"], "CONFIG_ERROR");
    }
}
