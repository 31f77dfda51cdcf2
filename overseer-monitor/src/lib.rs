//! Overseer Monitor
//!
//! Client-side tracking of server-owned job state, driven purely by polling.
//!
//! Architecture:
//! - Poller: one interval timer per view, alive only while a liveness predicate holds
//! - Countdown: cheap 1s re-render of "next run" countdowns, independent of network polling
//! - Cache: process-wide resource cache with tag invalidation
//! - Jobs: recurring job monitor (list, stop, resume, force run)
//! - Training: training job tracker (submit, track until terminal, side effects once)
//!
//! Every async completion is checked against the owner's liveness before it
//! touches shared state, so results that arrive after teardown are dropped.

pub mod api;
pub mod cache;
pub mod config;
pub mod countdown;
pub mod error;
pub mod jobs;
pub mod models;
pub mod notify;
pub mod poller;
pub mod training;

#[cfg(test)]
mod testing;

pub use api::{JobAction, JobApi, ModelApi, TrainingApi};
pub use cache::{CacheTag, ResourceCache, Versioned};
pub use config::MonitorConfig;
pub use countdown::{Countdown, CountdownTicker};
pub use error::{MonitorError, Result};
pub use jobs::JobMonitor;
pub use models::ModelCatalog;
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use poller::PollingController;
pub use training::{TrackerState, TrainingTracker, TrainingView};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
