//! Model catalog endpoints

use overseer_core::domain::model::ModelInfo;
use overseer_core::dto::model::ModelList;

use crate::BackendClient;
use crate::error::Result;

impl BackendClient {
    /// List all trained models
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.url("models/list");
        let response = self.client.get(&url).send().await?;

        let body: ModelList = self.handle_response(response).await?;
        Ok(body.data)
    }
}
