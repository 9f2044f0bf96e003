//! Retry wrapper for completion clients.
//!
//! The pipeline itself never retries a stage; all retry behavior lives
//! here, per binding. Only throttling and transient server failures are
//! retried, with exponential backoff and a Retry-After override when the
//! backend supplies one.

use async_trait::async_trait;
use byline_common::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{CompletionClient, CompletionRequest, CompletionResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

const TRANSIENT_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "500",
    "502",
    "503",
    "504",
    "internal server error",
    "bad gateway",
    "service unavailable",
    "gateway timeout",
    "overloaded",
];

pub struct RetryingClient<T: CompletionClient> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: CompletionClient> RetryingClient<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    fn is_transient(message: &str) -> bool {
        let lower = message.to_lowercase();
        TRANSIENT_MARKERS.iter().any(|m| lower.contains(m))
    }

    /// Honor an explicit `retry-after: N` (seconds) embedded in the error.
    fn retry_after_ms(message: &str) -> Option<u64> {
        let lower = message.to_lowercase();
        let pos = lower.find("retry-after")?;
        message[pos..]
            .split_whitespace()
            .skip(1)
            .find_map(|word| {
                word.trim_end_matches(|c: char| !c.is_ascii_digit())
                    .parse::<u64>()
                    .ok()
            })
            .map(|secs| secs * 1000)
    }

    fn backoff_ms(&self, attempt: u32) -> u64 {
        let exp = self.policy.initial_delay_ms as f64
            * self.policy.backoff_multiplier.powi(attempt as i32);
        let jitter = exp * 0.1 * jitter_fraction(attempt);
        ((exp + jitter) as u64).min(self.policy.max_delay_ms)
    }
}

/// Deterministic pseudo-random fraction in [0, 1), derived from the attempt
/// number so no rand dependency is needed.
fn jitter_fraction(attempt: u32) -> f64 {
    let hashed = attempt.wrapping_add(1).wrapping_mul(0x9E37_79B9);
    (hashed % 1000) as f64 / 1000.0
}

#[async_trait]
impl<T: CompletionClient> CompletionClient for RetryingClient<T> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let message = e.to_string();
                    if attempt >= self.policy.max_retries || !Self::is_transient(&message) {
                        return Err(e);
                    }

                    let delay = Self::retry_after_ms(&message)
                        .unwrap_or_else(|| self.backoff_ms(attempt));

                    warn!(
                        model = self.inner.model_name(),
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay,
                        error = %message,
                        "Retrying completion request"
                    );

                    tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                    attempt += 1;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byline_common::BylineError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyClient {
        failures_before_success: u32,
        calls: AtomicU32,
        error: String,
    }

    #[async_trait]
    impl CompletionClient for FlakyClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(BylineError::Backend(self.error.clone()))
            } else {
                Ok(CompletionResponse {
                    content: "ok".to_string(),
                    model: "flaky".to_string(),
                    usage: None,
                    finish_reason: None,
                })
            }
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 1.0,
        }
    }

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 30_000);
    }

    #[test]
    fn transient_classification() {
        assert!(RetryingClient::<FlakyClient>::is_transient(
            "chat completion endpoint returned 429 Too Many Requests"
        ));
        assert!(RetryingClient::<FlakyClient>::is_transient(
            "Anthropic API returned 503: service unavailable"
        ));
        assert!(RetryingClient::<FlakyClient>::is_transient(
            "backend overloaded, try later"
        ));
        assert!(!RetryingClient::<FlakyClient>::is_transient(
            "chat completion endpoint returned 401 Unauthorized"
        ));
        assert!(!RetryingClient::<FlakyClient>::is_transient(
            "malformed chat completion response"
        ));
    }

    #[test]
    fn retry_after_header_wins() {
        let delay =
            RetryingClient::<FlakyClient>::retry_after_ms("429, Retry-After: 7 seconds");
        assert_eq!(delay, Some(7000));
    }

    #[test]
    fn backoff_respects_ceiling() {
        let client = RetryingClient::new(
            FlakyClient {
                failures_before_success: 0,
                calls: AtomicU32::new(0),
                error: String::new(),
            },
            RetryPolicy {
                max_retries: 8,
                initial_delay_ms: 100,
                max_delay_ms: 1500,
                backoff_multiplier: 10.0,
            },
        );
        assert!(client.backoff_ms(6) <= 1500);
    }

    #[tokio::test]
    async fn transient_failure_is_retried_until_success() {
        let client = RetryingClient::new(
            FlakyClient {
                failures_before_success: 2,
                calls: AtomicU32::new(0),
                error: "502 bad gateway".to_string(),
            },
            fast_policy(),
        );
        let response = client.complete(CompletionRequest::default()).await.unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_failure_is_not_retried() {
        let client = RetryingClient::new(
            FlakyClient {
                failures_before_success: u32::MAX,
                calls: AtomicU32::new(0),
                error: "401 unauthorized".to_string(),
            },
            fast_policy(),
        );
        assert!(client.complete(CompletionRequest::default()).await.is_err());
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let client = RetryingClient::new(
            FlakyClient {
                failures_before_success: u32::MAX,
                calls: AtomicU32::new(0),
                error: "503 service unavailable".to_string(),
            },
            fast_policy(),
        );
        assert!(client.complete(CompletionRequest::default()).await.is_err());
        // Initial attempt plus three retries.
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 4);
    }
}
