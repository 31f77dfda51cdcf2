//! Recurring job scheduler endpoints

use overseer_core::domain::job::JobList;
use overseer_core::dto::job::JobControlRequest;
use tracing::debug;

use crate::BackendClient;
use crate::error::Result;

impl BackendClient {
    /// List all recurring jobs
    ///
    /// # Returns
    /// A full snapshot of every job, keyed by name
    pub async fn list_jobs(&self) -> Result<JobList> {
        let url = self.url("jobs/list");
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Ask the scheduler to stop a job
    ///
    /// # Arguments
    /// * `name` - The job name
    pub async fn stop_job(&self, name: &str) -> Result<()> {
        self.control_job("jobs/stop", name).await
    }

    /// Ask the scheduler to resume a stopped job
    ///
    /// # Arguments
    /// * `name` - The job name
    pub async fn resume_job(&self, name: &str) -> Result<()> {
        self.control_job("jobs/resume", name).await
    }

    /// Ask the scheduler to run a job immediately
    ///
    /// # Arguments
    /// * `name` - The job name
    pub async fn run_job_now(&self, name: &str) -> Result<()> {
        self.control_job("jobs/run-now", name).await
    }

    async fn control_job(&self, path: &str, name: &str) -> Result<()> {
        let url = self.url(path);
        debug!("POST {} for job {}", url, name);

        let response = self
            .client
            .post(&url)
            .json(&JobControlRequest::new(name))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
