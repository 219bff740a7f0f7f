mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = postforge_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let llm = postforge_llm::LlmClient::with_base_url(
        &config.llm_api_key,
        &config.llm_model,
        config.request_timeout_secs,
        &config.llm_base_url,
    )?;
    let directory = config
        .directory_api_key
        .as_deref()
        .map(|key| {
            postforge_directory::DirectoryClient::with_base_url(
                key,
                config.request_timeout_secs,
                &config.directory_base_url,
            )
        })
        .transpose()?;
    if directory.is_none() {
        tracing::warn!("DIRECTORY_API_KEY not set; runs will skip competitor research");
    }

    let orchestrator = postforge_pipeline::Orchestrator::new(
        llm,
        directory,
        postforge_pipeline::RetryPolicy {
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        },
    );
    let state = AppState::new(
        Arc::new(orchestrator),
        config.directory_api_key.is_some(),
        config.max_concurrent_runs,
    );
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "postforge server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
