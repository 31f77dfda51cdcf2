//! Job command handlers
//!
//! Lists, watches and controls recurring jobs.

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::*;
use overseer_core::domain::job::{JobList, JobSnapshot};
use overseer_core::presenter::{countdown_until, format_timestamp};
use overseer_monitor::{Countdown, JobAction, JobMonitor};

use super::Session;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List all jobs once
    List,
    /// Keep the job list on screen, refreshing while any job runs
    Watch,
    /// Stop a job
    Stop {
        /// Job name
        name: String,
    },
    /// Resume a stopped job
    Resume {
        /// Job name
        name: String,
    },
    /// Run a job immediately
    RunNow {
        /// Job name
        name: String,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, session: &Session) -> Result<()> {
    let monitor = JobMonitor::new(
        session.client.clone(),
        session.cache.clone(),
        session.notifier.clone(),
        session.config.monitor.job_poll_interval,
    );

    match command {
        JobCommands::List => list_jobs(&monitor).await,
        JobCommands::Watch => watch_jobs(&monitor, session).await,
        JobCommands::Stop { name } => control(&monitor, JobAction::Stop, &name).await,
        JobCommands::Resume { name } => control(&monitor, JobAction::Resume, &name).await,
        JobCommands::RunNow { name } => control(&monitor, JobAction::ForceRun, &name).await,
    }
}

async fn list_jobs(monitor: &JobMonitor) -> Result<()> {
    let jobs = monitor.list().await?;
    monitor.teardown();

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} job(s):", jobs.len()).bold());
    println!();
    let now = Utc::now();
    for job in jobs.iter() {
        print_job(job, &countdown_until(now, job.next_run));
    }

    Ok(())
}

async fn watch_jobs(monitor: &JobMonitor, session: &Session) -> Result<()> {
    monitor.list().await?;

    let mut snapshots = monitor.subscribe();
    let ticker = monitor.countdowns(session.config.monitor.countdown_interval);
    let mut countdowns = ticker.subscribe();

    loop {
        render_watch(
            snapshots.borrow_and_update().as_ref(),
            &countdowns.borrow_and_update(),
            monitor.is_polling(),
        );

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = countdowns.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    monitor.teardown();
    println!();
    Ok(())
}

async fn control(monitor: &JobMonitor, action: JobAction, name: &str) -> Result<()> {
    let result = monitor.control(action, name).await;
    monitor.teardown();
    result?;

    if let Some(job) = monitor.snapshot().as_ref().and_then(|jobs| jobs.get(name)) {
        println!();
        print_job(job, &countdown_until(Utc::now(), job.next_run));
    }
    Ok(())
}

fn render_watch(jobs: Option<&JobList>, countdowns: &[Countdown], polling: bool) {
    // Clear screen, cursor home
    print!("\x1B[2J\x1B[H");

    let refresh = if polling {
        "live".green()
    } else {
        "idle (no running jobs)".dimmed()
    };
    println!("{} {}", "Jobs".bold(), format!("[{}]", refresh).dimmed());
    println!("{}", "─".repeat(80).dimmed());

    let Some(jobs) = jobs else {
        println!("{}", "Loading...".dimmed());
        return;
    };
    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return;
    }

    for job in jobs.iter() {
        let remaining = countdowns
            .iter()
            .find(|c| c.name == job.name)
            .map(|c| c.remaining.clone())
            .unwrap_or_else(|| countdown_until(Utc::now(), job.next_run));
        print_job(job, &remaining);
    }
    println!("{}", "Press Ctrl-C to exit".dimmed());
}

fn print_job(job: &JobSnapshot, remaining: &str) {
    let status = if job.is_running {
        "Running".green()
    } else {
        "Stopped".dimmed()
    };

    println!("  {} {}", "▸".cyan(), job.name.bold());
    println!("    Status:   {}", status);
    println!("    Next run: {} ({})", remaining.cyan(), format_timestamp(job.next_run).dimmed());
    println!("    Last run: {}", format_timestamp(job.last_run).dimmed());
    if !job.tags.is_empty() {
        println!("    Tags:     {}", job.tags.join(", ").dimmed());
    }
    println!();
}
