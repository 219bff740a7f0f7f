use std::net::SocketAddr;

/// Application configuration, loaded once at startup and shared read-only.
#[derive(Clone)]
pub struct AppConfig {
    /// Credential for the generative-text service. Required.
    pub llm_api_key: String,
    /// Base URL of the OpenAI-compatible generative-text API.
    pub llm_base_url: String,
    /// Model identifier sent with every completion request.
    pub llm_model: String,
    /// Credential for the business-directory lookup. Optional: when absent,
    /// competitor research degrades instead of running.
    pub directory_api_key: Option<String>,
    /// Base URL of the Yelp-Fusion-style directory API.
    pub directory_base_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Per-external-call timeout. Timeouts are per call, not per run.
    pub request_timeout_secs: u64,
    /// Additional attempts after the first try, for transient stage errors.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Admission bound: maximum simultaneous in-flight pipeline runs.
    pub max_concurrent_runs: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("llm_api_key", &"[redacted]")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field(
                "directory_api_key",
                &self.directory_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("directory_base_url", &self.directory_base_url)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_concurrent_runs", &self.max_concurrent_runs)
            .finish()
    }
}
