use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let llm_api_key = require("LLM_API_KEY")?;
    let llm_base_url = or_default("POSTFORGE_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("POSTFORGE_LLM_MODEL", "gpt-4o-mini");

    let directory_api_key = lookup("DIRECTORY_API_KEY").ok();
    let directory_base_url = or_default("POSTFORGE_DIRECTORY_BASE_URL", "https://api.yelp.com/v3");

    let bind_addr = parse_addr("POSTFORGE_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("POSTFORGE_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("POSTFORGE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("POSTFORGE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("POSTFORGE_RETRY_BACKOFF_BASE_MS", "500")?;
    let max_concurrent_runs = parse_usize("POSTFORGE_MAX_CONCURRENT_RUNS", "8")?;

    if max_concurrent_runs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "POSTFORGE_MAX_CONCURRENT_RUNS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        llm_api_key,
        llm_base_url,
        llm_model,
        directory_api_key,
        directory_base_url,
        bind_addr,
        log_level,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        max_concurrent_runs,
    })
}
