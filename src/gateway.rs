//! Completion gateway
//!
//! Stateless translation from (prior history, new utterance) to a single
//! assistant utterance through one request to the completion service. The
//! gateway never touches the conversation; it only reads the history it is
//! handed.

mod prompt;

pub use prompt::{build_prompt, SYSTEM_INSTRUCTION};

use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmResponse, LlmService, SystemContent};
use crate::message::Message;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Reply used when the service answers with no text
pub const EMPTY_RESPONSE_APOLOGY: &str =
    "I apologize, I could not generate a response at this time.";

/// Failure to obtain a reply from the completion service
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no completion model is configured")]
    Unavailable,
    #[error("completion request failed after {attempts} attempt(s): {source}")]
    Service {
        attempts: u32,
        #[source]
        source: LlmError,
    },
}

/// Gateway tuning
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Total attempts per submission; 1 means no retry
    pub max_attempts: u32,
    /// Backoff unit between attempts (multiplied by the attempt number)
    pub retry_delay: Duration,
    /// Upper bound on any single wait, including a provider's Retry-After
    pub max_retry_delay: Duration,
    pub max_tokens: Option<u32>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            max_tokens: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let max_attempts = std::env::var("ASSISTANT_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Wait before the next attempt, capped at `max_retry_delay`
    fn delay_before_retry(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after
            .unwrap_or(self.retry_delay * attempt)
            .min(self.max_retry_delay)
    }
}

/// Adapter between the conversation store and the completion service
pub struct CompletionGateway {
    llm: Option<Arc<dyn LlmService>>,
    config: GatewayConfig,
}

impl CompletionGateway {
    /// `llm` is `None` when no model is configured; every call then fails.
    pub fn new(llm: Option<Arc<dyn LlmService>>, config: GatewayConfig) -> Self {
        Self { llm, config }
    }

    /// Ask the service to answer `utterance` given the prior `history`.
    ///
    /// An empty reply counts as success and yields [`EMPTY_RESPONSE_APOLOGY`].
    pub async fn respond(&self, history: &[Message], utterance: &str) -> Result<String, GatewayError> {
        let llm = self.llm.as_ref().ok_or(GatewayError::Unavailable)?;
        let request = self.build_request(history, utterance);

        let mut attempt = 1;
        loop {
            match llm.complete(&request).await {
                Ok(response) => return Ok(extract_reply(&response)),
                Err(e) if e.kind.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.delay_before_retry(attempt, e.retry_after);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "Completion request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(GatewayError::Service {
                        attempts: attempt,
                        source: e,
                    })
                }
            }
        }
    }

    fn build_request(&self, history: &[Message], utterance: &str) -> LlmRequest {
        LlmRequest {
            system: vec![SystemContent::new(SYSTEM_INSTRUCTION)],
            messages: vec![LlmMessage::user(build_prompt(history, utterance))],
            max_tokens: self.config.max_tokens,
        }
    }
}

fn extract_reply(response: &LlmResponse) -> String {
    let text = response.text();
    if text.trim().is_empty() {
        EMPTY_RESPONSE_APOLOGY.to_string()
    } else {
        text
    }
}
