//! Ollama client for the generative backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docaudit_core::audit::backend::{build_prompt, parse_backend_response};
use docaudit_core::error::BackendError;
use docaudit_core::models::config::BackendConfig;
use docaudit_core::{Document, ExtractionResult, RequestedCriteria};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Outcome of a failed attempt.
enum AttemptError {
    /// Transport failure or server error; worth another try.
    Transient(String),
    /// Anything else; returned as is.
    Fatal(BackendError),
}

/// Client for `POST /api/generate` on an Ollama server.
pub struct OllamaClient {
    http: reqwest::Client,
    url: String,
    config: BackendConfig,
}

impl OllamaClient {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docaudit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            config: config.clone(),
        })
    }

    /// Audit a document through the model.
    ///
    /// The answer must follow the four-line contract; a malformed answer is a
    /// [`BackendError::ProtocolViolation`] and is not retried.
    pub async fn audit(
        &self,
        document: &Document,
        criteria: &RequestedCriteria,
    ) -> Result<ExtractionResult, BackendError> {
        let prompt = build_prompt(&document.text, criteria);
        let raw = self.generate(&prompt).await?;
        debug!("{}: backend answered {:?}", document.source_name(), raw);

        parse_backend_response(&raw, criteria)
    }

    /// Send a prompt, retrying transient failures with linear backoff.
    pub async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let mut attempt: u32 = 0;

        loop {
            match self.try_generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(AttemptError::Transient(reason)) if attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(self.config.retry_backoff_ms * attempt as u64);
                    warn!(
                        "Backend request failed ({}), retry {}/{} in {:?}",
                        reason, attempt, self.config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptError::Transient(reason)) => return Err(BackendError::Request(reason)),
                Err(AttemptError::Fatal(err)) => return Err(err),
            }
        }
    }

    async fn try_generate(&self, prompt: &str) -> Result<String, AttemptError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttemptError::Transient(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(AttemptError::Fatal(BackendError::Request(format!(
                "HTTP {}",
                status
            ))));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            AttemptError::Fatal(BackendError::ProtocolViolation(format!(
                "unexpected response body: {}",
                e
            )))
        })?;

        Ok(body.response)
    }
}
