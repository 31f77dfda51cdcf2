//! Recurring Job Monitor
//!
//! Holds the latest job list snapshot, drives stop / resume / force-run, and
//! keeps the list fresh only while at least one job is running. An all-stopped
//! list is static, so polling it would only waste requests.
//!
//! The displayed state is always the last successful fetch: control actions
//! never flip `is_running` locally, they invalidate the cached list and
//! refetch it.

use overseer_core::domain::job::JobList;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{JobAction, JobApi};
use crate::cache::{CacheTag, ResourceCache, Versioned};
use crate::countdown::CountdownTicker;
use crate::error::{MonitorError, Result};
use crate::lock;
use crate::notify::{Notification, Notifier};
use crate::poller::PollingController;

/// Job list monitor bound to one view's lifetime
///
/// Dropping the monitor tears it down.
pub struct JobMonitor {
    inner: Arc<MonitorInner>,
    poller: PollingController,
    poll_interval: Duration,
}

struct MonitorInner {
    api: Arc<dyn JobApi>,
    cache: Arc<ResourceCache>,
    notifier: Arc<dyn Notifier>,
    snapshot: watch::Sender<Option<JobList>>,
    published: Mutex<u64>,
    in_flight: Mutex<HashSet<(JobAction, String)>>,
    torn_down: AtomicBool,
}

/// Clears a busy flag when the request finishes, however it finishes
struct InFlight<'a> {
    set: &'a Mutex<HashSet<(JobAction, String)>>,
    key: (JobAction, String),
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.key);
    }
}

impl JobMonitor {
    /// Creates a monitor; nothing is fetched until [`JobMonitor::list`]
    pub fn new(
        api: Arc<dyn JobApi>,
        cache: Arc<ResourceCache>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            inner: Arc::new(MonitorInner {
                api,
                cache,
                notifier,
                snapshot,
                published: Mutex::new(0),
                in_flight: Mutex::new(HashSet::new()),
                torn_down: AtomicBool::new(false),
            }),
            poller: PollingController::new("job list"),
            poll_interval,
        }
    }

    /// Reads the job list through the cache and publishes it
    ///
    /// Starts polling if any job is running and no poller is active.
    pub async fn list(&self) -> Result<JobList> {
        let list = self.inner.load().await?;
        self.ensure_polling();
        Ok(list)
    }

    /// Latest successfully fetched job list
    pub fn snapshot(&self) -> Option<JobList> {
        self.inner.snapshot.borrow().clone()
    }

    /// Channel that changes whenever a new job list is published
    pub fn subscribe(&self) -> watch::Receiver<Option<JobList>> {
        self.inner.snapshot.subscribe()
    }

    /// Spawns a countdown ticker over this monitor's snapshots
    pub fn countdowns(&self, interval: Duration) -> CountdownTicker {
        CountdownTicker::spawn(interval, self.subscribe())
    }

    /// True while the list is being polled
    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// True while `action` is in flight for job `name`
    pub fn is_busy(&self, action: JobAction, name: &str) -> bool {
        lock(&self.inner.in_flight).contains(&(action, name.to_string()))
    }

    pub async fn stop(&self, name: &str) -> Result<()> {
        self.control(JobAction::Stop, name).await
    }

    pub async fn resume(&self, name: &str) -> Result<()> {
        self.control(JobAction::Resume, name).await
    }

    pub async fn force_run(&self, name: &str) -> Result<()> {
        self.control(JobAction::ForceRun, name).await
    }

    /// Sends one control action and refreshes the list on success
    ///
    /// On failure the operator is notified with the job name and the
    /// backend's message; the displayed snapshot is left as it was.
    pub async fn control(&self, action: JobAction, name: &str) -> Result<()> {
        if self.inner.is_torn_down() {
            return Err(MonitorError::TornDown);
        }

        let _in_flight = self.inner.begin(action, name)?;
        info!("Requesting {} for job {}", action, name);

        match self.inner.api.control_job(action, name).await {
            Ok(()) => {
                if self.inner.is_torn_down() {
                    debug!("Dropping {} result for job {}: monitor torn down", action, name);
                    return Ok(());
                }

                self.inner.cache.invalidate(CacheTag::Jobs);
                self.inner
                    .notifier
                    .notify(Notification::success("Success", action.success_message(name)));

                if let Err(e) = self.list().await {
                    warn!("Failed to refresh jobs after {}: {}", action, e);
                    if !matches!(e, MonitorError::TornDown) {
                        self.inner.notifier.notify(Notification::error(
                            "Error",
                            format!("Failed to refresh jobs: {}", e.detail()),
                        ));
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!("Failed to {} job {}: {}", action, name, e);
                let err = MonitorError::from(e);
                if !self.inner.is_torn_down() {
                    self.inner.notifier.notify(Notification::error(
                        "Error",
                        format!("Failed to {} job \"{}\": {}", action, name, err.detail()),
                    ));
                }
                Err(err)
            }
        }
    }

    /// Cancels polling and discards any result that arrives afterwards
    pub fn teardown(&self) {
        self.inner.torn_down.store(true, Ordering::SeqCst);
        self.poller.stop();
    }

    fn ensure_polling(&self) {
        if self.inner.is_torn_down() || self.poller.is_active() {
            return;
        }

        let predicate = {
            let inner = Arc::clone(&self.inner);
            move || inner.should_poll()
        };
        let refresh = {
            let inner = Arc::clone(&self.inner);
            move || {
                let inner = Arc::clone(&inner);
                async move {
                    if let Err(e) = inner.poll().await {
                        warn!("Job list poll failed: {}", e);
                    }
                }
            }
        };

        self.poller.start(predicate, self.poll_interval, refresh);
    }
}

impl Drop for JobMonitor {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl MonitorInner {
    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Liveness predicate for the job list poller
    fn should_poll(&self) -> bool {
        !self.is_torn_down()
            && self
                .snapshot
                .borrow()
                .as_ref()
                .is_some_and(JobList::any_running)
    }

    fn begin(&self, action: JobAction, name: &str) -> Result<InFlight<'_>> {
        let key = (action, name.to_string());
        if !lock(&self.in_flight).insert(key.clone()) {
            return Err(MonitorError::Busy {
                action,
                name: name.to_string(),
            });
        }
        Ok(InFlight {
            set: &self.in_flight,
            key,
        })
    }

    /// Reads the list through the cache and publishes it
    async fn load(&self) -> Result<JobList> {
        let list = self
            .cache
            .read_versioned(CacheTag::Jobs, || self.api.list_jobs())
            .await?;
        self.publish(list)
    }

    /// Refetches the list; a response superseded in flight is dropped
    async fn poll(&self) -> Result<()> {
        match self
            .cache
            .refetch(CacheTag::Jobs, || self.api.list_jobs())
            .await?
        {
            Some(list) => self.publish(list).map(drop),
            None => {
                debug!("Dropping superseded job list poll");
                Ok(())
            }
        }
    }

    /// Publishes `list` unless a newer version is already on display
    fn publish(&self, list: Versioned<JobList>) -> Result<JobList> {
        if self.is_torn_down() {
            debug!("Discarding job list: monitor torn down");
            return Err(MonitorError::TornDown);
        }

        let mut published = lock(&self.published);
        if list.version < *published {
            debug!(
                "Skipping job list v{}: v{} already published",
                list.version, *published
            );
            let shown = self.snapshot.borrow().clone();
            return Ok(shown.unwrap_or_else(|| JobList::clone(&list.value)));
        }
        *published = list.version;

        debug!(
            "Fetched {} job(s), {} running",
            list.value.len(),
            list.value.iter().filter(|job| job.is_running).count()
        );
        let jobs = JobList::clone(&list.value);
        self.snapshot.send_replace(Some(jobs.clone()));
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeJobApi, RecordingNotifier, job};
    use tokio::time;

    struct Harness {
        api: Arc<FakeJobApi>,
        cache: Arc<ResourceCache>,
        notifier: Arc<RecordingNotifier>,
        monitor: JobMonitor,
    }

    fn harness(jobs: JobList) -> Harness {
        let api = Arc::new(FakeJobApi::new(jobs));
        let cache = Arc::new(ResourceCache::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let monitor = JobMonitor::new(
            api.clone(),
            cache.clone(),
            notifier.clone(),
            Duration::from_secs(3),
        );
        Harness {
            api,
            cache,
            notifier,
            monitor,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_stopped_list_is_fetched_once() {
        let h = harness(JobList::from_jobs([job("a", false), job("b", false)]));

        let list = h.monitor.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(!h.monitor.is_polling());

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.api.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_while_any_job_running() {
        let h = harness(JobList::from_jobs([job("a", true), job("b", false)]));

        h.monitor.list().await.unwrap();
        assert!(h.monitor.is_polling());

        time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(h.api.list_calls(), 4);

        h.api.set_jobs(JobList::from_jobs([job("a", false), job("b", false)]));
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.api.list_calls(), 5);
        assert!(!h.monitor.snapshot().unwrap().any_running());

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.api.list_calls(), 5);
        assert!(!h.monitor.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failures_do_not_stop_polling() {
        let h = harness(JobList::from_jobs([job("a", true)]));
        h.monitor.list().await.unwrap();

        h.api.fail_lists(true);
        time::sleep(Duration::from_millis(6_500)).await;
        assert_eq!(h.api.list_calls(), 3);
        assert!(h.monitor.is_polling());
        assert!(h.monitor.snapshot().unwrap().get("a").unwrap().is_running);

        h.api.fail_lists(false);
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.api.list_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_polling() {
        let h = harness(JobList::from_jobs([job("a", true)]));
        h.monitor.list().await.unwrap();

        h.monitor.teardown();
        time::sleep(Duration::from_secs(30)).await;

        assert_eq!(h.api.list_calls(), 1);
        assert!(!h.monitor.is_polling());
        assert!(matches!(h.monitor.list().await, Err(MonitorError::TornDown)));
    }

    #[tokio::test]
    async fn test_stop_success_invalidates_once_and_refreshes() {
        let h = harness(JobList::from_jobs([job("x", true)]));
        h.monitor.list().await.unwrap();

        h.api.set_jobs(JobList::from_jobs([job("x", false)]));
        h.monitor.stop("x").await.unwrap();

        assert_eq!(h.api.controls(), vec![(JobAction::Stop, "x".to_string())]);
        assert_eq!(h.cache.invalidation_count(CacheTag::Jobs), 1);
        assert_eq!(h.api.list_calls(), 2);
        assert!(!h.monitor.snapshot().unwrap().get("x").unwrap().is_running);

        let notes = h.notifier.take();
        assert_eq!(notes.len(), 1);
        assert!(!notes[0].is_error());
        assert_eq!(notes[0].message, "Job \"x\" has been stopped successfully!");
    }

    #[tokio::test]
    async fn test_stop_failure_leaves_snapshot_untouched() {
        let h = harness(JobList::from_jobs([job("x", true)]));
        h.monitor.list().await.unwrap();

        h.api.fail_controls("job is locked by another operator");
        let err = h.monitor.stop("x").await.unwrap_err();

        assert!(matches!(err, MonitorError::Client(_)));
        assert!(h.monitor.snapshot().unwrap().get("x").unwrap().is_running);
        assert_eq!(h.cache.invalidation_count(CacheTag::Jobs), 0);
        assert_eq!(h.api.list_calls(), 1);

        let notes = h.notifier.take();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert_eq!(
            notes[0].message,
            "Failed to stop job \"x\": job is locked by another operator"
        );
        assert!(!h.monitor.is_busy(JobAction::Stop, "x"));
    }

    #[tokio::test]
    async fn test_duplicate_action_rejected_while_in_flight() {
        let h = harness(JobList::from_jobs([job("x", false)]));
        h.monitor.list().await.unwrap();
        let gate = h.api.gate_controls();

        let first = h.monitor.force_run("x");
        let second = async {
            tokio::task::yield_now().await;
            assert!(h.monitor.is_busy(JobAction::ForceRun, "x"));
            assert!(!h.monitor.is_busy(JobAction::Stop, "x"));
            let dup = h.monitor.force_run("x").await;
            gate.notify_one();
            dup
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_ok());
        assert!(matches!(second, Err(MonitorError::Busy { .. })));
        assert_eq!(h.api.controls().len(), 1);
        assert!(!h.monitor.is_busy(JobAction::ForceRun, "x"));
    }

    #[tokio::test]
    async fn test_result_after_teardown_is_discarded() {
        let h = harness(JobList::from_jobs([job("x", true)]));
        h.monitor.list().await.unwrap();
        let gate = h.api.gate_controls();

        let action = h.monitor.resume("x");
        let teardown = async {
            tokio::task::yield_now().await;
            h.monitor.teardown();
            gate.notify_one();
        };
        let (result, ()) = tokio::join!(action, teardown);

        assert!(result.is_ok());
        assert!(h.notifier.take().is_empty());
        assert_eq!(h.cache.invalidation_count(CacheTag::Jobs), 0);
        assert_eq!(h.api.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_restarts_polling() {
        let h = harness(JobList::from_jobs([job("x", false)]));
        h.monitor.list().await.unwrap();
        assert!(!h.monitor.is_polling());

        h.api.set_jobs(JobList::from_jobs([job("x", true)]));
        h.monitor.resume("x").await.unwrap();
        assert!(h.monitor.is_polling());

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(h.api.list_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdowns_follow_snapshot() {
        let h = harness(JobList::from_jobs([job("x", false)]));
        let ticker = h.monitor.countdowns(Duration::from_secs(1));

        h.monitor.list().await.unwrap();
        time::sleep(Duration::from_millis(1_500)).await;

        let rows = ticker.current();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "x");
        assert_eq!(rows[0].remaining, "N/A");
        assert_eq!(h.api.list_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_poll_does_not_overwrite_newer_list() {
        let h = harness(JobList::from_jobs([job("a", true), job("x", false)]));
        h.monitor.list().await.unwrap();

        h.api.stall_next_list(
            Duration::from_secs(5),
            JobList::from_jobs([job("a", false), job("x", false)]),
        );
        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(h.api.list_calls(), 2);

        h.api.set_jobs(JobList::from_jobs([job("a", false), job("x", true)]));
        h.monitor.resume("x").await.unwrap();
        assert!(h.monitor.snapshot().unwrap().get("x").unwrap().is_running);

        time::sleep(Duration::from_secs(5)).await;
        assert!(h.monitor.snapshot().unwrap().get("x").unwrap().is_running);
        assert!(h.monitor.is_polling());

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.api.list_calls(), 4);
        assert!(h.monitor.is_polling());
    }
}
