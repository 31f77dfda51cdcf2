//! In-memory fakes for lifecycle tests

use async_trait::async_trait;
use overseer_client::{ClientError, Result};
use overseer_core::domain::job::{JobList, JobSnapshot};
use overseer_core::domain::model::{ModelInfo, ModelValidation};
use overseer_core::domain::training::{RequestId, TrainingRequest, TrainingStatus};
use overseer_core::dto::training::SubmitTraining;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::Duration;

use crate::api::{JobAction, JobApi, ModelApi, TrainingApi};
use crate::lock;
use crate::notify::{Notification, Notifier};

pub fn job(name: &str, is_running: bool) -> JobSnapshot {
    JobSnapshot {
        name: name.to_string(),
        is_running,
        next_run: None,
        last_run: None,
        tags: vec![],
    }
}

pub fn status(id: RequestId, status: TrainingStatus, progress: f64) -> TrainingRequest {
    TrainingRequest {
        id,
        status,
        progress,
        description: None,
        error_message: None,
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *lock(&self.seen))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.seen).push(notification);
    }
}

pub struct FakeJobApi {
    jobs: Mutex<JobList>,
    fail_lists: AtomicBool,
    stalled: Mutex<Option<(Duration, JobList)>>,
    control_failure: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    list_calls: AtomicUsize,
    controls: Mutex<Vec<(JobAction, String)>>,
}

impl FakeJobApi {
    pub fn new(jobs: JobList) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            fail_lists: AtomicBool::new(false),
            stalled: Mutex::new(None),
            control_failure: Mutex::new(None),
            gate: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            controls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_jobs(&self, jobs: JobList) {
        *lock(&self.jobs) = jobs;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Makes the next list request answer `jobs` only after `delay`
    pub fn stall_next_list(&self, delay: Duration, jobs: JobList) {
        *lock(&self.stalled) = Some((delay, jobs));
    }

    pub fn fail_controls(&self, message: &str) {
        *lock(&self.control_failure) = Some(message.to_string());
    }

    /// Holds every control request until the returned gate is notified
    pub fn gate_controls(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn controls(&self) -> Vec<(JobAction, String)> {
        lock(&self.controls).clone()
    }
}

#[async_trait]
impl JobApi for FakeJobApi {
    async fn list_jobs(&self) -> Result<JobList> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(ClientError::api_error(503, "scheduler unavailable"));
        }
        let stalled = lock(&self.stalled).take();
        if let Some((delay, jobs)) = stalled {
            tokio::time::sleep(delay).await;
            return Ok(jobs);
        }
        Ok(lock(&self.jobs).clone())
    }

    async fn control_job(&self, action: JobAction, name: &str) -> Result<()> {
        lock(&self.controls).push((action, name.to_string()));

        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match lock(&self.control_failure).clone() {
            Some(message) => Err(ClientError::api_error(409, message)),
            None => Ok(()),
        }
    }
}

/// Training API fake that replays a scripted status sequence
///
/// The last scripted status repeats once the script runs out.
pub struct FakeTrainingApi {
    next_id: RequestId,
    submit_failure: Mutex<Option<String>>,
    script: Mutex<VecDeque<TrainingRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl FakeTrainingApi {
    pub fn new(next_id: RequestId, script: impl IntoIterator<Item = TrainingRequest>) -> Self {
        Self {
            next_id,
            submit_failure: Mutex::new(None),
            script: Mutex::new(script.into_iter().collect()),
            gate: Mutex::new(None),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_submit(&self, message: &str) {
        *lock(&self.submit_failure) = Some(message.to_string());
    }

    /// Holds every status request until the returned gate is notified
    pub fn gate_status(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrainingApi for FakeTrainingApi {
    async fn submit_training(&self, _req: &SubmitTraining) -> Result<RequestId> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.submit_failure).clone() {
            Some(message) => Err(ClientError::api_error(400, message)),
            None => Ok(self.next_id),
        }
    }

    async fn training_status(&self, request_id: RequestId) -> Result<TrainingRequest> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        let next = {
            let mut script = lock(&self.script);
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        let gate = lock(&self.gate).clone();
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }

        next.map(|mut req| {
            req.id = request_id;
            req
        })
        .ok_or_else(|| ClientError::api_error(404, "request not found"))
    }
}

pub struct FakeModelApi {
    calls: AtomicUsize,
}

impl FakeModelApi {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelApi for FakeModelApi {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((0..n)
            .map(|i| ModelInfo {
                name: format!("model_{}", i),
                metadata: None,
                validation: ModelValidation::default(),
            })
            .collect())
    }
}
