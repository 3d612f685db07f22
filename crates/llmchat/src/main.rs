use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use llmchat::config::Config;
use llmchat::llm::{Provider, ProviderRegistry};
use llmchat::repl::{self, Repl};
use llmchat::server::{AppState, build_app};
use llmchat::session::ChatSelection;

#[derive(Parser, Debug)]
#[command(name = "llmchat", version, about = "Chat with Gemini, OpenRouter and Groq models")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, default_value = "llmchat.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Chat interactively in the terminal
    Chat {
        #[arg(long, default_value = "gemini")]
        provider: Provider,
        /// Defaults to the provider's first model
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("load config {}", cli.config.display()))?;
    let registry = ProviderRegistry::from_config(&config.providers);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let app = build_app(
                AppState::new(registry),
                config.server.request_timeout_seconds,
            );

            let listener = tokio::net::TcpListener::bind((host.as_str(), port))
                .await
                .with_context(|| format!("bind {host}:{port}"))?;
            info!(addr = %listener.local_addr()?, "Server listening");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("Server stopped");
        }
        Commands::Chat { provider, model } => {
            let selection = match model {
                Some(model) => ChatSelection::with_model(provider, model),
                None => ChatSelection::new(provider),
            };
            // Keys are only entered through the hidden /key prompt.
            repl::run(Repl::new(registry, selection, None)).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
