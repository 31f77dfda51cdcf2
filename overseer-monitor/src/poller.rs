//! Polling Controller
//!
//! Runs a refresh callback on a fixed interval for as long as a liveness
//! predicate holds. Ticks never overlap: the next timer is only scheduled
//! after the previous refresh has completed and the predicate has been
//! re-evaluated.

use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use tracing::debug;

use crate::lock;

/// Owner of at most one polling timer
///
/// Dropping the controller cancels the timer.
pub struct PollingController {
    name: &'static str,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingController {
    /// Creates an idle controller; `name` only labels log lines
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            task: Mutex::new(None),
        }
    }

    /// Starts polling, replacing any timer this controller already owns
    ///
    /// The predicate is evaluated before every timer is scheduled, including
    /// the first. The refresh outcome is not inspected: a failing refresh
    /// does not stop the loop, only the predicate does.
    ///
    /// # Returns
    /// `true` if a timer was scheduled
    pub fn start<P, F, Fut>(&self, predicate: P, interval: Duration, refresh: F) -> bool
    where
        P: Fn() -> bool + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut task = lock(&self.task);
        if let Some(previous) = task.take() {
            previous.abort();
        }

        if !predicate() {
            debug!("{} poller not started: nothing to watch", self.name);
            return false;
        }

        debug!("Starting {} poller (interval: {:?})", self.name, interval);
        let name = self.name;
        *task = Some(tokio::spawn(async move {
            loop {
                time::sleep(interval).await;
                refresh().await;

                if !predicate() {
                    debug!("{} poller stopped: nothing left to watch", name);
                    break;
                }
            }
        }));

        true
    }

    /// Cancels the timer, if any. Safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(task) = lock(&self.task).take() {
            debug!("Stopping {} poller", self.name);
            task.abort();
        }
    }

    /// True while a timer is scheduled or a refresh is running
    pub fn is_active(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop();
    }
}
