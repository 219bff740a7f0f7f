//! HTTP client for the business-search endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::DirectoryError;
use crate::types::{Business, BusinessSearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3";

/// Number of competitors requested per lookup.
const SEARCH_LIMIT: u32 = 5;

/// Client for the local-business-directory REST API.
///
/// Use [`DirectoryClient::new`] for production or
/// [`DirectoryClient::with_base_url`] to point at a mock server in tests.
pub struct DirectoryClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl DirectoryClient {
    /// Creates a new client pointed at the production directory API.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, DirectoryError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] if the underlying `reqwest::Client` cannot
    /// be constructed or `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("postforge/0.1 (content-pipeline)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| DirectoryError::Api {
            status: 0,
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Searches the directory for businesses matching `term` near `location`,
    /// sorted by rating.
    ///
    /// Returns an empty `Vec` when the directory finds nothing; callers must
    /// treat that as a valid result.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Timeout`] if the call times out or cannot connect.
    /// - [`DirectoryError::RateLimited`] on HTTP 429.
    /// - [`DirectoryError::Api`] on any other non-2xx status.
    /// - [`DirectoryError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn search_businesses(
        &self,
        term: &str,
        location: &str,
    ) -> Result<Vec<Business>, DirectoryError> {
        let mut url = self
            .base_url
            .join("businesses/search")
            .map_err(|e| DirectoryError::Api {
                status: 0,
                message: format!("invalid endpoint URL: {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("term", term);
            pairs.append_pair("location", location);
            pairs.append_pair("limit", &SEARCH_LIMIT.to_string());
            pairs.append_pair("sort_by", "rating");
        }

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(DirectoryError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let envelope: BusinessSearchResponse =
            serde_json::from_str(&text).map_err(|e| DirectoryError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        tracing::debug!(
            term,
            location,
            found = envelope.businesses.len(),
            "directory search completed"
        );
        Ok(envelope.businesses)
    }
}
