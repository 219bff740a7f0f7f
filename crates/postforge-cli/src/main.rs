use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use postforge_pipeline::{render_artifact, Orchestrator, Request, RetryPolicy};

#[derive(Debug, Parser)]
#[command(name = "postforge-cli")]
#[command(about = "Postforge command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full content pipeline for one business description.
    Run {
        /// Free-text business description, e.g. "cafe in San Jose, free
        /// cookie with latte purchase".
        #[arg(long)]
        text: String,
        /// Session identifier; defaults to a one-off value.
        #[arg(long, default_value = "cli")]
        session: String,
        /// Print the raw artifact as JSON instead of the rendered post.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = postforge_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            text,
            session,
            json,
        } => {
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
                tracing::warn!("DIRECTORY_API_KEY not set; skipping competitor research");
            }

            let orchestrator = Orchestrator::new(
                llm,
                directory,
                RetryPolicy {
                    max_retries: config.max_retries,
                    backoff_base_ms: config.retry_backoff_base_ms,
                },
            );
            let request = Request::new(text, session);
            let artifact = orchestrator.run(&request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&artifact)?);
            } else {
                print!("{}", render_artifact(&artifact));
            }
        }
    }

    Ok(())
}
