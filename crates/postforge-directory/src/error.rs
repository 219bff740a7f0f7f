use thiserror::Error;

/// Errors returned by the directory-lookup client.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The request did not complete within the configured timeout, or the
    /// connection could not be established.
    #[error("directory lookup timed out: {context}")]
    Timeout { context: String },

    /// HTTP 429 from the directory service.
    #[error("directory service rate limited (retry-after: {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-2xx HTTP status other than 429.
    #[error("directory service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Network or TLS failure that is not a timeout or connect failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("directory response deserialization failed for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            DirectoryError::Timeout {
                context: e.to_string(),
            }
        } else {
            DirectoryError::Http(e)
        }
    }
}
