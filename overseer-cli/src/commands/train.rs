//! Training command handler
//!
//! Submits a training run and follows it until it completes or fails.

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use overseer_core::domain::training::{TrainingRequest, TrainingStatus};
use overseer_core::dto::training::TrainingParams;
use overseer_monitor::{TrackerState, TrainingTracker, TrainingView};
use std::io::Write;

use super::Session;

/// Arguments of `overseer train`
#[derive(Args)]
pub struct TrainArgs {
    /// Model name; an existing name re-trains that model
    model_name: String,

    /// Tune hyperparameters automatically
    #[arg(long)]
    auto_tune: bool,

    /// Optimisation trials (required with --auto-tune, 1-1000)
    #[arg(long, requires = "auto_tune")]
    trials: Option<u32>,

    /// Restrict training data to one category
    #[arg(long)]
    category: Option<u64>,
}

impl From<TrainArgs> for TrainingParams {
    fn from(args: TrainArgs) -> Self {
        TrainingParams {
            model_name: args.model_name,
            auto_tune: args.auto_tune,
            trials: args.trials,
            category_id: args.category,
        }
    }
}

/// Handle `overseer train`
pub async fn handle_train(args: TrainArgs, session: &Session) -> Result<()> {
    let tracker = TrainingTracker::new(
        session.client.clone(),
        session.cache.clone(),
        session.notifier.clone(),
        session.config.monitor.training_poll_interval,
    );
    let mut views = tracker.subscribe();

    let params = TrainingParams::from(args);
    let request_id = tracker.submit(&params).await?;
    println!(
        "{} {}",
        "Training started, request".bold(),
        request_id.to_string().cyan()
    );

    tracker.refresh().await;

    loop {
        let view = views.borrow_and_update().clone();
        if let Some(req) = &view.last {
            print_progress(req);
        }
        if finished(&view) {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracker.teardown();
                println!();
                println!(
                    "{}",
                    format!("Stopped following request {}; training continues on the backend.", request_id)
                        .yellow()
                );
                return Ok(());
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    println!();
    tracker.teardown();

    match tracker.snapshot().last.map(|req| req.status) {
        Some(TrainingStatus::Failed) => bail!("Training request {} failed", request_id),
        _ => Ok(()),
    }
}

fn finished(view: &TrainingView) -> bool {
    view.state == TrackerState::Idle && view.last.as_ref().is_some_and(|req| req.status.is_terminal())
}

fn print_progress(req: &TrainingRequest) {
    const WIDTH: usize = 30;
    let filled = usize::from(req.percent()) * WIDTH / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH - filled));

    let status = match req.status {
        TrainingStatus::Pending => req.status.to_string().normal(),
        TrainingStatus::Running => req.status.to_string().cyan(),
        TrainingStatus::Completed => req.status.to_string().green(),
        TrainingStatus::Failed => req.status.to_string().red(),
    };

    print!("\r\x1B[2K{} {:>3}% {}", bar, req.percent(), status);
    if let Some(description) = &req.description {
        print!("  {}", description.dimmed());
    }
    let _ = std::io::stdout().flush();
}
