//! Training endpoints

use overseer_core::domain::training::{RequestId, TrainingRequest};
use overseer_core::dto::DataEnvelope;
use overseer_core::dto::training::{SubmitTraining, SubmitTrainingResponse};

use crate::BackendClient;
use crate::error::Result;

impl BackendClient {
    /// Submit a training request
    ///
    /// # Arguments
    /// * `req` - A validated training request body
    ///
    /// # Returns
    /// The id to poll with [`BackendClient::training_status`]
    pub async fn submit_training(&self, req: &SubmitTraining) -> Result<RequestId> {
        let url = self.url("training/submit");
        let response = self.client.post(&url).json(req).send().await?;

        let body: DataEnvelope<SubmitTrainingResponse> = self.handle_response(response).await?;
        Ok(body.into_inner().request_id)
    }

    /// Get the current state of a training request
    ///
    /// # Arguments
    /// * `request_id` - The id returned by the submit call
    pub async fn training_status(&self, request_id: RequestId) -> Result<TrainingRequest> {
        let url = self.url(&format!("training/status/{}", request_id));
        let response = self.client.get(&url).send().await?;

        let body: DataEnvelope<TrainingRequest> = self.handle_response(response).await?;
        Ok(body.into_inner())
    }
}
