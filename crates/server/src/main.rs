//! Jharkhand tourism guide server.
//!
//! Loads the configuration, the knowledge index and the structured records
//! once, then serves `POST /api/chat` and `GET /health`.

mod api;
mod error;

use anyhow::Context;
use clap::Parser;
use guide_chat::{ChatService, GuideContext};
use guide_core::{config::AppConfig, logging};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Domain-restricted tourism chat service
#[derive(Parser, Debug)]
#[command(name = "guide")]
#[command(about = "Jharkhand tourism guide chat service", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory with the index, record files and prompt overrides
    #[arg(short, long, env = "GUIDE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to the YAML config file
    #[arg(short, long, env = "GUIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Socket address to listen on
    #[arg(short, long, env = "GUIDE_BIND")]
    bind: Option<String>,

    /// LLM provider (gemini, mock)
    #[arg(short, long, env = "GUIDE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, env = "GUIDE_MODEL")]
    model: Option<String>,

    /// Log level or filter (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output (`NO_COLOR` is read from the environment)
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.data_dir.clone(), cli.config)
        .context("failed to load configuration")?
        .with_overrides(
            cli.data_dir,
            cli.bind,
            cli.provider,
            cli.model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    logging::init_logging(
        config.logging.level.as_deref(),
        !config.logging.color,
        config.logging.json,
    )?;

    tracing::info!("Jharkhand guide starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Provider: {} ({})", config.llm.provider, config.llm.model);

    config.validate().context("invalid configuration")?;

    let context = GuideContext::from_config(&config).context("failed to load serving state")?;
    let service = ChatService::new(Arc::new(context));

    let app = api::build_router(
        service,
        Duration::from_secs(config.server.request_timeout_secs),
    );
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
