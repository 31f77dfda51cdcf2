//! Training Job Tracker
//!
//! State machine: `Idle -> Submitting -> Tracking(id) -> Idle`.
//!
//! A submission yields a request id that becomes the only polling key. The
//! tracker polls that id until the first terminal status, then drops it and
//! fires the completion side effects. Dropping the id and deciding to fire
//! happen under one lock, so overlapping responses that also report a
//! terminal status find nothing left to finish.
//!
//! Status requests are strictly sequential: timer ticks and manual refreshes
//! take turns on one async guard, so at most one request is in flight.

use overseer_core::domain::training::{RequestId, TrainingRequest, TrainingStatus};
use overseer_core::dto::training::TrainingParams;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::api::TrainingApi;
use crate::cache::{CacheTag, ResourceCache};
use crate::error::{MonitorError, Result};
use crate::lock;
use crate::notify::{Notification, Notifier};
use crate::poller::PollingController;

/// Tracker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Submitting,
    Tracking(RequestId),
}

/// Read-only view of the tracker for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingView {
    pub state: TrackerState,
    /// Last status observed for the current (or most recent) request
    pub last: Option<TrainingRequest>,
}

impl TrainingView {
    fn idle() -> Self {
        Self {
            state: TrackerState::Idle,
            last: None,
        }
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.state == TrackerState::Idle
            && !self
                .last
                .as_ref()
                .is_some_and(|req| req.status.is_active())
    }

    pub fn is_submitting(&self) -> bool {
        self.state == TrackerState::Submitting
    }

    pub fn tracked_id(&self) -> Option<RequestId> {
        match self.state {
            TrackerState::Tracking(id) => Some(id),
            _ => None,
        }
    }
}

struct Held {
    view: TrainingView,
    torn_down: bool,
}

struct TrackerInner {
    api: Arc<dyn TrainingApi>,
    cache: Arc<ResourceCache>,
    notifier: Arc<dyn Notifier>,
    held: Mutex<Held>,
    polling: AsyncMutex<()>,
    published: watch::Sender<TrainingView>,
}

/// Training job tracker bound to one view's lifetime
///
/// Dropping the tracker tears it down.
pub struct TrainingTracker {
    inner: Arc<TrackerInner>,
    poller: PollingController,
    poll_interval: Duration,
}

impl TrainingTracker {
    pub fn new(
        api: Arc<dyn TrainingApi>,
        cache: Arc<ResourceCache>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        let (published, _) = watch::channel(TrainingView::idle());
        Self {
            inner: Arc::new(TrackerInner {
                api,
                cache,
                notifier,
                held: Mutex::new(Held {
                    view: TrainingView::idle(),
                    torn_down: false,
                }),
                polling: AsyncMutex::new(()),
                published,
            }),
            poller: PollingController::new("training status"),
            poll_interval,
        }
    }

    /// Current view
    pub fn snapshot(&self) -> TrainingView {
        lock(&self.inner.held).view.clone()
    }

    /// Channel that changes on every state or status update
    pub fn subscribe(&self) -> watch::Receiver<TrainingView> {
        self.inner.published.subscribe()
    }

    pub fn can_submit(&self) -> bool {
        let held = lock(&self.inner.held);
        !held.torn_down && held.view.can_submit()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Validates and submits a training request, then starts tracking it
    ///
    /// Rejected without a request when a run is already in progress or the
    /// parameters are invalid. On submission failure the tracker returns to
    /// `Idle`.
    pub async fn submit(&self, params: &TrainingParams) -> Result<RequestId> {
        let req = {
            let mut held = lock(&self.inner.held);
            if held.torn_down {
                return Err(MonitorError::TornDown);
            }
            if !held.view.can_submit() {
                drop(held);
                debug!("Rejecting submit: training already in progress");
                self.inner.notifier.notify(Notification::error(
                    "Training",
                    "A training run is already in progress",
                ));
                return Err(MonitorError::AlreadyTracking);
            }

            let req = match params.validate() {
                Ok(req) => req,
                Err(e) => {
                    drop(held);
                    self.inner
                        .notifier
                        .notify(Notification::error("Invalid training request", e.to_string()));
                    return Err(e.into());
                }
            };

            held.view = TrainingView {
                state: TrackerState::Submitting,
                last: None,
            };
            self.inner.publish(&held.view);
            req
        };

        info!("Submitting training for model {}", req.model_name);
        let submitted = self.inner.api.submit_training(&req).await;

        let mut held = lock(&self.inner.held);
        if held.torn_down {
            debug!("Discarding submit result: tracker torn down");
            return Err(MonitorError::TornDown);
        }

        match submitted {
            Ok(id) => {
                held.view.state = TrackerState::Tracking(id);
                self.inner.publish(&held.view);
                drop(held);

                info!("Tracking training request {}", id);
                self.start_polling();
                Ok(id)
            }
            Err(e) => {
                held.view.state = TrackerState::Idle;
                self.inner.publish(&held.view);
                drop(held);

                warn!("Training submission failed: {}", e);
                let title = match &e {
                    overseer_client::ClientError::ApiError { status, .. } => {
                        format!("{} ERROR", status)
                    }
                    _ => "Training Failed".to_string(),
                };
                let err = MonitorError::from(e);
                self.inner
                    .notifier
                    .notify(Notification::error(title, format!("Details: {}", err.detail())));
                Err(err)
            }
        }
    }

    /// Polls the tracked request once without waiting for the timer
    ///
    /// Waits for any status request already in flight.
    pub async fn refresh(&self) {
        self.inner.poll().await;
    }

    /// Cancels polling and discards any response that arrives afterwards
    pub fn teardown(&self) {
        lock(&self.inner.held).torn_down = true;
        self.poller.stop();
    }

    fn start_polling(&self) {
        let predicate = {
            let inner = Arc::clone(&self.inner);
            move || inner.tracked_id().is_some()
        };
        let refresh = {
            let inner = Arc::clone(&self.inner);
            move || {
                let inner = Arc::clone(&inner);
                async move { inner.poll().await }
            }
        };

        self.poller.start(predicate, self.poll_interval, refresh);
    }
}

impl Drop for TrainingTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl TrackerInner {
    fn publish(&self, view: &TrainingView) {
        self.published.send_replace(view.clone());
    }

    /// Liveness predicate: a tracking handle is held
    fn tracked_id(&self) -> Option<RequestId> {
        let held = lock(&self.held);
        if held.torn_down {
            return None;
        }
        held.view.tracked_id()
    }

    async fn poll(&self) {
        let _turn = self.polling.lock().await;
        let Some(id) = self.tracked_id() else {
            return;
        };

        match self.api.training_status(id).await {
            Ok(req) => self.apply(id, req),
            Err(e) => warn!("Failed to poll training request {}: {}", id, e),
        }
    }

    /// Applies a status response for `id`
    ///
    /// Ignored unless `id` is still the tracked handle. On the first terminal
    /// status the handle is dropped and the side effects fire.
    fn apply(&self, id: RequestId, req: TrainingRequest) {
        let finished = {
            let mut held = lock(&self.held);
            if held.torn_down || held.view.tracked_id() != Some(id) {
                debug!("Discarding status for request {}: no longer tracked", id);
                return;
            }
            if req.id != id {
                warn!("Status response for request {} while tracking {}", req.id, id);
                return;
            }
            if let Some(last) = &held.view.last {
                if !last.status.can_advance_to(req.status) {
                    debug!(
                        "Ignoring backward transition {} -> {} for request {}",
                        last.status, req.status, id
                    );
                    return;
                }
            }

            let terminal = req.status.is_terminal();
            if terminal {
                held.view.state = TrackerState::Idle;
            }
            held.view.last = Some(req.clone());
            self.publish(&held.view);

            terminal.then_some(req)
        };

        if let Some(req) = finished {
            self.finish(req);
        }
    }

    fn finish(&self, req: TrainingRequest) {
        match req.status {
            TrainingStatus::Completed => {
                info!("Training request {} completed", req.id);
                self.cache.invalidate(CacheTag::Models);
                self.notifier.notify(Notification::success(
                    "Training Completed",
                    "Model training has been completed successfully!",
                ));
            }
            TrainingStatus::Failed => {
                let reason = req.error_message.as_deref().unwrap_or("Unknown error");
                warn!("Training request {} failed: {}", req.id, reason);
                self.notifier.notify(Notification::error(
                    "Training Failed",
                    format!("Training failed: {}", reason),
                ));
            }
            TrainingStatus::Pending | TrainingStatus::Running => {}
        }
    }
}
