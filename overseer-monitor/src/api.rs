//! Backend API seams
//!
//! The monitor depends on these traits rather than on the HTTP client
//! directly, so lifecycle logic can be exercised against in-memory fakes.

use async_trait::async_trait;
use overseer_client::{BackendClient, Result};
use overseer_core::domain::job::JobList;
use overseer_core::domain::model::ModelInfo;
use overseer_core::domain::training::{RequestId, TrainingRequest};
use overseer_core::dto::training::SubmitTraining;
use std::fmt;

/// Control actions on a recurring job
///
/// Each is an "ensure state" request, so repeating one is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    Stop,
    Resume,
    ForceRun,
}

impl JobAction {
    /// Success message shown after the backend accepted the action
    pub fn success_message(self, name: &str) -> String {
        match self {
            Self::Stop => format!("Job \"{}\" has been stopped successfully!", name),
            Self::Resume => format!("Job \"{}\" has been resumed successfully!", name),
            Self::ForceRun => format!("Job \"{}\" is now running!", name),
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Stop => "stop",
            Self::Resume => "resume",
            Self::ForceRun => "force run",
        };
        f.write_str(verb)
    }
}

/// Recurring job scheduler operations
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Fetches the full job list
    async fn list_jobs(&self) -> Result<JobList>;

    /// Sends one control action for the named job
    async fn control_job(&self, action: JobAction, name: &str) -> Result<()>;
}

/// Training operations
#[async_trait]
pub trait TrainingApi: Send + Sync {
    /// Submits a validated training request and returns its tracking id
    async fn submit_training(&self, req: &SubmitTraining) -> Result<RequestId>;

    /// Fetches the current state of a tracked request
    async fn training_status(&self, request_id: RequestId) -> Result<TrainingRequest>;
}

/// Model catalog operations
#[async_trait]
pub trait ModelApi: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

#[async_trait]
impl JobApi for BackendClient {
    async fn list_jobs(&self) -> Result<JobList> {
        BackendClient::list_jobs(self).await
    }

    async fn control_job(&self, action: JobAction, name: &str) -> Result<()> {
        match action {
            JobAction::Stop => self.stop_job(name).await,
            JobAction::Resume => self.resume_job(name).await,
            JobAction::ForceRun => self.run_job_now(name).await,
        }
    }
}

#[async_trait]
impl TrainingApi for BackendClient {
    async fn submit_training(&self, req: &SubmitTraining) -> Result<RequestId> {
        BackendClient::submit_training(self, req).await
    }

    async fn training_status(&self, request_id: RequestId) -> Result<TrainingRequest> {
        BackendClient::training_status(self, request_id).await
    }
}

#[async_trait]
impl ModelApi for BackendClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        BackendClient::list_models(self).await
    }
}
