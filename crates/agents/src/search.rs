//! Capability tools: external services an agent may call to augment its
//! prompt context before the model call.

use async_trait::async_trait;
use byline_common::{BylineError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SERPER_API_URL: &str = "https://google.serper.dev/search";

/// An external capability an agent may invoke. Stateless between
/// invocations; owned by the agent that declares it.
#[async_trait]
pub trait CapabilityTool: Send + Sync {
    fn name(&self) -> &str;

    /// Run the tool and render its findings as plain text suitable for
    /// appending to a prompt.
    async fn invoke(&self, query: &str) -> Result<String>;
}

#[derive(Serialize)]
struct SearchBody<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Deserialize)]
struct SearchReply {
    #[serde(default)]
    organic: Vec<OrganicHit>,
}

#[derive(Deserialize)]
struct OrganicHit {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Web search via the Serper.dev API.
pub struct SerperSearchTool {
    api_key: String,
    max_results: u32,
    http_client: reqwest::Client,
}

impl SerperSearchTool {
    pub fn new(api_key: String, max_results: u32) -> Self {
        Self {
            api_key,
            max_results,
            http_client: reqwest::Client::new(),
        }
    }

    fn render_hits(hits: &[OrganicHit]) -> String {
        if hits.is_empty() {
            return "No results found.".to_string();
        }
        hits.iter()
            .enumerate()
            .map(|(i, hit)| {
                let snippet = hit.snippet.as_deref().unwrap_or("");
                format!("{}. {} ({})\n   {}", i + 1, hit.title, hit.link, snippet)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl CapabilityTool for SerperSearchTool {
    fn name(&self) -> &str {
        "web search"
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        let body = SearchBody {
            q: query,
            num: self.max_results,
        };

        let response = self
            .http_client
            .post(SERPER_API_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BylineError::Backend(format!("web search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(BylineError::Backend(format!(
                "web search API returned {status}: {body_text}"
            )));
        }

        let reply: SearchReply = response
            .json()
            .await
            .map_err(|e| BylineError::Backend(format!("malformed web search response: {e}")))?;

        debug!(query, hits = reply.organic.len(), "Web search completed");
        Ok(Self::render_hits(&reply.organic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_body_shape() {
        let body = SearchBody {
            q: "renewable energy policy",
            num: 10,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["q"], "renewable energy policy");
        assert_eq!(json["num"], 10);
    }

    #[test]
    fn hits_render_as_numbered_list() {
        let hits = vec![
            OrganicHit {
                title: "EU energy roadmap".to_string(),
                link: "https://example.org/roadmap".to_string(),
                snippet: Some("The roadmap outlines...".to_string()),
            },
            OrganicHit {
                title: "Grid storage".to_string(),
                link: "https://example.org/storage".to_string(),
                snippet: None,
            },
        ];
        let rendered = SerperSearchTool::render_hits(&hits);
        assert!(rendered.starts_with("1. EU energy roadmap"));
        assert!(rendered.contains("https://example.org/roadmap"));
        assert!(rendered.contains("The roadmap outlines..."));
        assert!(rendered.contains("2. Grid storage"));
    }

    #[test]
    fn empty_hits_render_placeholder() {
        assert_eq!(SerperSearchTool::render_hits(&[]), "No results found.");
    }

    #[test]
    fn reply_parses_without_organic_field() {
        let reply: SearchReply = serde_json::from_str("{}").unwrap();
        assert!(reply.organic.is_empty());
    }
}
