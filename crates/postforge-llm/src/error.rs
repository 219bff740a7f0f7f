use thiserror::Error;

/// Errors returned by the generative-text client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request did not complete within the configured timeout, or the
    /// connection could not be established.
    #[error("generative-text call timed out: {context}")]
    Timeout { context: String },

    /// HTTP 429 from the service. `retry_after_secs` carries the
    /// `Retry-After` header when the service sent one.
    #[error("generative-text service rate limited (retry-after: {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-2xx HTTP status other than 429.
    #[error("generative-text service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Network or TLS failure from the underlying HTTP client that is not a
    /// timeout or connect failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The response envelope could not be deserialized into the expected type.
    #[error("completion envelope deserialization failed for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service returned a well-formed envelope with no completion text.
    #[error("completion contained no choices")]
    EmptyCompletion,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            LlmError::Timeout {
                context: e.to_string(),
            }
        } else {
            LlmError::Http(e)
        }
    }
}
