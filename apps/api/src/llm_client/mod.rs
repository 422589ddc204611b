/// LLM Client — the single point of entry for all text-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the model server directly.
/// All LLM interactions MUST go through `CompletionClient`.
///
/// The production client speaks the Ollama-style non-streaming generate API:
/// `POST {base}/api/generate` → `{"response": "..."}`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const GENERATE_PATH: &str = "/api/generate";
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model server unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Completion contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub options: CompletionOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

/// One synchronous request/response call to a text-completion model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    error: String,
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

/// HTTP completion client with retry on 429, 5xx and connection errors.
/// Timeouts are owned by the underlying `reqwest::Client`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    retry_base_delay: Duration,
}

impl LlmClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{GENERATE_PATH}", base_url.trim_end_matches('/')),
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    /// Overrides the first backoff delay (doubles on each retry).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.options.temperature,
                num_predict: request.options.max_output_tokens,
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = self.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.endpoint).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM server returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ServerError>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateResponse = response.json().await?;

            debug!(
                model = %request.model,
                prompt_tokens = ?parsed.prompt_eval_count,
                output_tokens = ?parsed.eval_count,
                "LLM call succeeded"
            );

            let text = parsed.response.ok_or(LlmError::EmptyContent)?;
            return Ok(Completion { text });
        }

        Err(last_error.unwrap_or(LlmError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test double
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order and records every request it receives.
    /// Once the script runs out, each call fails with a 503.
    #[derive(Default)]
    pub struct ScriptedLlm {
        script: Mutex<VecDeque<Result<String, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        pub fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let llm = Self::default();
            for response in responses {
                llm.push(Ok(response.into()));
            }
            llm
        }

        pub fn push(&self, response: Result<String, LlmError>) {
            self.script.lock().unwrap().push_back(response);
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(text)) => Ok(Completion { text }),
                Some(Err(e)) => Err(e),
                None => Err(LlmError::Api {
                    status: 503,
                    message: "script exhausted".to_string(),
                }),
            }
        }
    }
}
