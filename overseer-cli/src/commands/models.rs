//! Model command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use overseer_core::presenter::format_timestamp;
use overseer_monitor::ModelCatalog;

use super::Session;

/// Model subcommands
#[derive(Subcommand)]
pub enum ModelCommands {
    /// List trained models
    List,
}

/// Handle model commands
pub async fn handle_model_command(command: ModelCommands, session: &Session) -> Result<()> {
    let catalog = ModelCatalog::new(session.client.clone(), session.cache.clone());

    match command {
        ModelCommands::List => list_models(&catalog).await,
    }
}

async fn list_models(catalog: &ModelCatalog) -> Result<()> {
    let models = catalog.models().await?;

    if models.is_empty() {
        println!("{}", "No models found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} model(s):", models.len()).bold());
    println!();
    for model in models.iter() {
        let validity = match (model.validation.exists, model.validation.valid) {
            (true, true) => "valid".green(),
            (true, false) => "invalid".red(),
            (false, _) => "missing".yellow(),
        };

        println!("  {} {} [{}]", "▸".cyan(), model.name.bold(), validity);
        match &model.metadata {
            Some(meta) => {
                println!(
                    "    RMSE: {:.4}  R²: {:.4}  MAE: {:.4}",
                    meta.rmse, meta.r2, meta.mae
                );
                println!("    Saved: {}", format_timestamp(meta.saved_at).dimmed());
            }
            None => println!("    {}", "No metadata".dimmed()),
        }
        println!();
    }

    Ok(())
}
