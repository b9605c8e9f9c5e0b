//! Parley - Discord chat bot
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod server;

const DEFAULT_LOG_FILTER: &str = "parley=info,parley_core=info,parley_channels=info,serenity=warn";

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    // The token now lives in `cli`. Clear it while the process is still
    // single-threaded; the runtime's workers do not exist yet.
    std::env::remove_var("DISCORD_BOT_TOKEN");

    build_runtime()?.block_on(run(cli))
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

async fn run(cli: cli::Cli) -> Result<()> {
    let data_dir = cli.data.clone().unwrap_or_else(server::default_data_dir);
    let mut config = server::load_config(Some(data_dir.as_path()))?;
    cli.apply(&mut config);

    init_tracing(config.logging.json);
    info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;
    server::run(config).await
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
