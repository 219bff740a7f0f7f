//! Shared configuration for postforge.
//!
//! Loads the application configuration from environment variables (with
//! `.env` support via `dotenvy`) and exposes it as a typed [`AppConfig`].
//! The parsing logic is decoupled from the process environment so it can be
//! tested with a plain `HashMap` lookup.

pub mod app_config;
pub mod config;

mod error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
