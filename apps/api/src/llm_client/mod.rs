/// LLM Client — the single point of entry for all Claude API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod retry;

use retry::{run_with_retry, CallOutcome, RetryPolicy};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {attempts} attempts: {last}")]
    RateLimited { attempts: u32, last: String },

    #[error("Content rejected by safety filters: {0}")]
    SafetyRejected(String),

    #[error("Invalid API credentials: {0}")]
    InvalidCredentials(String),

    #[error("Response violated the expected schema: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    message: String,
}

/// The single LLM client used by all services.
/// Wraps the Anthropic Messages API with a retry policy and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: String, retry_policy: RetryPolicy) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            retry_policy,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Transient failures are retried per the client's `RetryPolicy`.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let request_body = &request_body;
        run_with_retry(&self.retry_policy, move |_| self.attempt(request_body)).await
    }

    async fn attempt(&self, request_body: &AnthropicRequest<'_>) -> CallOutcome<LlmResponse> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request_body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return classify_transport_failure(e),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return classify_api_failure(status.as_u16(), &body);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_transport_failure(e),
        };

        let outcome = classify_success_body(&body);
        if let CallOutcome::Success(llm_response) = &outcome {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );
        }
        outcome
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Timeouts and connection failures are transient; anything else reqwest
/// reports (bad request construction, redirect loops, decode errors) is not.
fn classify_transport_failure<T>(e: reqwest::Error) -> CallOutcome<T> {
    if e.is_timeout() || e.is_connect() {
        CallOutcome::Retryable(LlmError::Http(e))
    } else {
        CallOutcome::Terminal(LlmError::Http(e))
    }
}

/// Classifies the body of a 2xx response.
fn classify_success_body(body: &str) -> CallOutcome<LlmResponse> {
    let llm_response: LlmResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            return CallOutcome::Terminal(LlmError::Malformed(format!(
                "response is not a Messages envelope: {e}"
            )))
        }
    };

    if llm_response.stop_reason.as_deref() == Some("refusal") {
        return CallOutcome::Terminal(LlmError::SafetyRejected(
            "the model declined to analyze this content".to_string(),
        ));
    }

    CallOutcome::Success(llm_response)
}

/// Classifies a non-2xx API response.
///
/// The structured `error.type` is consulted first, then the HTTP status, and
/// only then substring heuristics over the message.
fn classify_api_failure<T>(status: u16, body: &str) -> CallOutcome<T> {
    let parsed = serde_json::from_str::<AnthropicError>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());
    let error_type = parsed.and_then(|e| e.error.error_type);

    match error_type.as_deref() {
        Some("rate_limit_error") | Some("overloaded_error") | Some("api_error") => {
            return CallOutcome::Retryable(LlmError::Api { status, message })
        }
        Some("authentication_error") | Some("permission_error") => {
            return CallOutcome::Terminal(LlmError::InvalidCredentials(message))
        }
        _ => {}
    }

    match status {
        429 | 529 => return CallOutcome::Retryable(LlmError::Api { status, message }),
        s if (500..600).contains(&s) => {
            return CallOutcome::Retryable(LlmError::Api { status, message })
        }
        401 | 403 => return CallOutcome::Terminal(LlmError::InvalidCredentials(message)),
        _ => {}
    }

    let lower = message.to_lowercase();
    if ["rate limit", "too many requests", "quota"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        CallOutcome::Retryable(LlmError::Api { status, message })
    } else if ["api key", "api_key", "credential", "unauthorized"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        CallOutcome::Terminal(LlmError::InvalidCredentials(message))
    } else if ["safety", "blocked", "harmful", "usage policy"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        CallOutcome::Terminal(LlmError::SafetyRejected(message))
    } else {
        CallOutcome::Terminal(LlmError::Api { status, message })
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
