//! Model catalog DTOs

use serde::{Deserialize, Serialize};

use crate::domain::model::ModelInfo;

/// Response of the model list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}
