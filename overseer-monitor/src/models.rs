//! Model catalog
//!
//! Read-through view of the trained model list. Training completion
//! invalidates [`CacheTag::Models`], so the next read picks up new models.

use overseer_core::domain::model::ModelInfo;
use std::sync::Arc;

use crate::api::ModelApi;
use crate::cache::{CacheTag, ResourceCache};
use crate::error::Result;

pub struct ModelCatalog {
    api: Arc<dyn ModelApi>,
    cache: Arc<ResourceCache>,
}

impl ModelCatalog {
    pub fn new(api: Arc<dyn ModelApi>, cache: Arc<ResourceCache>) -> Self {
        Self { api, cache }
    }

    /// Returns the model list, refetching only if it was invalidated
    pub async fn models(&self) -> Result<Arc<Vec<ModelInfo>>> {
        let models = self
            .cache
            .read(CacheTag::Models, || self.api.list_models())
            .await?;
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use crate::testing::{FakeModelApi, FakeTrainingApi, RecordingNotifier, status};
    use crate::training::TrainingTracker;
    use overseer_core::domain::training::TrainingStatus;
    use overseer_core::dto::training::TrainingParams;
    use tokio::time::{self, Duration};

    #[tokio::test]
    async fn test_models_cached_until_invalidated() {
        let api = Arc::new(FakeModelApi::new());
        let cache = Arc::new(ResourceCache::new());
        let catalog = ModelCatalog::new(api.clone(), cache.clone());

        assert_eq!(catalog.models().await.unwrap().len(), 1);
        assert_eq!(catalog.models().await.unwrap().len(), 1);
        assert_eq!(api.calls(), 1);

        cache.invalidate(CacheTag::Models);
        assert_eq!(catalog.models().await.unwrap().len(), 2);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_training_completion_refreshes_catalog() {
        let models = Arc::new(FakeModelApi::new());
        let training = Arc::new(FakeTrainingApi::new(
            11,
            [status(0, TrainingStatus::Completed, 1.0)],
        ));
        let cache = Arc::new(ResourceCache::new());
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());

        let catalog = ModelCatalog::new(models.clone(), cache.clone());
        let tracker = TrainingTracker::new(training, cache, notifier, Duration::from_secs(1));

        catalog.models().await.unwrap();
        tracker
            .submit(&TrainingParams::new("retention_v3"))
            .await
            .unwrap();
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(catalog.models().await.unwrap().len(), 2);
        assert_eq!(models.calls(), 2);
    }
}
