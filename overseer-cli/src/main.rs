//! Overseer CLI
//!
//! Terminal console for the automation backend: watch and control recurring
//! jobs, submit and follow training runs, browse trained models.

mod commands;
mod config;
mod notifier;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "overseer")]
#[command(about = "Automation backend console", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "OVERSEER_BACKEND_URL", default_value = "http://localhost:8080")]
    backend_url: String,

    #[command(subcommand)]
    command: Commands,
}

/// Log filter used when `RUST_LOG` is unset; covers every `overseer_*` crate
const DEFAULT_LOG_FILTER: &str = "overseer=warn";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.backend_url)?;

    handle_command(cli.command, &config).await
}
