//! Trained model catalog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trained model known to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Metadata", default)]
    pub metadata: Option<ModelMetadata>,
    #[serde(alias = "Validation", default)]
    pub validation: ModelValidation,
}

/// Evaluation metrics recorded when the model was saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub rmse: f64,
    pub r2: f64,
    pub mae: f64,
    #[serde(default, deserialize_with = "super::de::timestamp")]
    pub saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelValidation {
    #[serde(alias = "IsExists", default)]
    pub exists: bool,
    #[serde(alias = "IsValid", default)]
    pub valid: bool,
}
