//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod jobs;
mod models;
mod train;

pub use jobs::JobCommands;
pub use models::ModelCommands;
pub use train::TrainArgs;

use anyhow::{Context, Result};
use clap::Subcommand;
use overseer_client::BackendClient;
use overseer_monitor::{Notifier, ResourceCache};
use std::sync::Arc;

use crate::config::Config;
use crate::notifier::TerminalNotifier;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Recurring job management
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Submit a training run and follow it to completion
    Train(TrainArgs),
    /// Trained model catalog
    Models {
        #[command(subcommand)]
        command: ModelCommands,
    },
}

/// Shared handles every command works with
pub struct Session {
    pub config: Config,
    pub client: Arc<BackendClient>,
    pub cache: Arc<ResourceCache>,
    pub notifier: Arc<dyn Notifier>,
}

impl Session {
    fn new(config: &Config) -> Result<Self> {
        let client = BackendClient::with_timeout(
            config.monitor.backend_url.clone(),
            config.monitor.request_timeout,
        )
        .context("Failed to build HTTP client")?;

        Ok(Self {
            config: config.clone(),
            client: Arc::new(client),
            cache: Arc::new(ResourceCache::new()),
            notifier: Arc::new(TerminalNotifier),
        })
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let session = Session::new(config)?;

    match command {
        Commands::Jobs { command } => jobs::handle_job_command(command, &session).await,
        Commands::Train(args) => train::handle_train(args, &session).await,
        Commands::Models { command } => models::handle_model_command(command, &session).await,
    }
}
