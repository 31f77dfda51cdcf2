//! Countdown ticker
//!
//! Re-renders "time until next run" for every job on its own cadence. It only
//! reads the latest job snapshot, so it never causes network traffic, and it
//! keeps ticking while the network poller is idle.

use chrono::{DateTime, Utc};
use overseer_core::domain::job::JobList;
use overseer_core::presenter::countdown_until;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::debug;

/// Rendered countdown for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub name: String,
    pub remaining: String,
}

/// Renders countdowns for every job in `jobs`, in name order
pub fn render_countdowns(now: DateTime<Utc>, jobs: &JobList) -> Vec<Countdown> {
    jobs.iter()
        .map(|job| Countdown {
            name: job.name.clone(),
            remaining: countdown_until(now, job.next_run),
        })
        .collect()
}

/// Background task publishing fresh countdowns on a fixed cadence
///
/// Stops when dropped, or when the job snapshot it reads from goes away.
pub struct CountdownTicker {
    task: JoinHandle<()>,
    rendered: watch::Receiver<Vec<Countdown>>,
}

impl CountdownTicker {
    /// Spawns the ticker over a job snapshot channel
    pub fn spawn(interval: Duration, mut jobs: watch::Receiver<Option<JobList>>) -> Self {
        let (tx, rendered) = watch::channel(Vec::new());

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = jobs.changed() => {
                        if changed.is_err() {
                            debug!("Job snapshot closed, stopping countdown ticker");
                            break;
                        }
                    }
                }

                let rows = match jobs.borrow().as_ref() {
                    Some(list) => render_countdowns(Utc::now(), list),
                    None => Vec::new(),
                };
                if tx.send(rows).is_err() {
                    break;
                }
            }
        });

        Self { task, rendered }
    }

    /// Latest rendered countdowns
    pub fn current(&self) -> Vec<Countdown> {
        self.rendered.borrow().clone()
    }

    /// Channel that changes on every render
    pub fn subscribe(&self) -> watch::Receiver<Vec<Countdown>> {
        self.rendered.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
