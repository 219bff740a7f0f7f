//! HTTP client for the chat-completions endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, Message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_COMPLETION_TOKENS: u32 = 1_024;

/// Client for an OpenAI-compatible chat-completions API.
///
/// Manages the HTTP client, API key, model, and base URL. Use
/// [`LlmClient::new`] for production or [`LlmClient::with_base_url`] to point
/// at a mock server in tests.
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl LlmClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the underlying `reqwest::Client` cannot be
    /// constructed or `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("postforge/0.1 (content-pipeline)")
            .build()?;

        // Normalise: exactly one trailing slash so join() appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LlmError::Api {
            status: 0,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Sends one completion request and returns the completion text.
    ///
    /// `temperature` is stage-specific: extraction stages run cold (0.3),
    /// creative stages warmer (0.7).
    ///
    /// # Errors
    ///
    /// - [`LlmError::Timeout`] if the call times out or cannot connect.
    /// - [`LlmError::RateLimited`] on HTTP 429.
    /// - [`LlmError::Api`] on any other non-2xx status.
    /// - [`LlmError::Deserialize`] if the envelope does not parse.
    /// - [`LlmError::EmptyCompletion`] if the envelope carries no choices.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| LlmError::Api {
                status: 0,
                message: format!("invalid endpoint URL: {e}"),
            })?;

        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature,
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(LlmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        let text = response.text().await?;
        let envelope: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let completion = envelope
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyCompletion)?
            .message
            .content;

        tracing::debug!(chars = completion.len(), "completion received");
        Ok(completion)
    }
}

/// Clips upstream error bodies so they never flood the logs.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}
