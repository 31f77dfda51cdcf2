//! Training submission DTOs and client-side validation

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::domain::training::RequestId;

pub const MIN_MODEL_NAME_LEN: usize = 3;
pub const TRIALS_RANGE: RangeInclusive<u32> = 1..=1000;

/// Body of the training submit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTraining {
    pub model_name: String,
    pub auto_tune: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trials: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
}

/// Response of the training submit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTrainingResponse {
    pub request_id: RequestId,
}

/// Training parameters as entered by the operator, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingParams {
    pub model_name: String,
    pub auto_tune: bool,
    /// Required only when `auto_tune` is enabled
    pub trials: Option<u32>,
    pub category_id: Option<u64>,
}

/// Reasons a training submission is rejected before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Model name is required")]
    MissingModelName,

    #[error("Model name must be at least 3 characters")]
    ModelNameTooShort,

    #[error("Only letters, numbers, underscore and dash allowed in model name")]
    InvalidModelName,

    #[error("Trials number is required when auto-tune is enabled")]
    MissingTrials,

    #[error("Trials must be between 1 and 1000, got {0}")]
    TrialsOutOfRange(u32),
}

impl TrainingParams {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    /// Enables auto-tuning with the given trial count
    pub fn with_auto_tune(mut self, trials: Option<u32>) -> Self {
        self.auto_tune = true;
        self.trials = trials;
        self
    }

    pub fn with_category(mut self, category_id: u64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Validates the parameters and builds the request body
    ///
    /// Trials are dropped from the request when auto-tune is off.
    pub fn validate(&self) -> Result<SubmitTraining, ValidationError> {
        let name = self.model_name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingModelName);
        }
        if name.chars().count() < MIN_MODEL_NAME_LEN {
            return Err(ValidationError::ModelNameTooShort);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::InvalidModelName);
        }

        let trials = if self.auto_tune {
            let trials = self.trials.ok_or(ValidationError::MissingTrials)?;
            if !TRIALS_RANGE.contains(&trials) {
                return Err(ValidationError::TrialsOutOfRange(trials));
            }
            Some(trials)
        } else {
            None
        };

        Ok(SubmitTraining {
            model_name: name.to_string(),
            auto_tune: self.auto_tune,
            trials,
            category_id: self.category_id,
        })
    }
}
