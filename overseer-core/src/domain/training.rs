//! Training request domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier returned by a training submission; the sole polling key
pub type RequestId = u64;

/// Training request status
///
/// Encoded on the wire as an integer. Variants are ordered: a request only
/// ever moves forward through `Pending -> Running -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TrainingStatus {
    Pending = 0,
    Running = 1,
    Completed = 2,
    Failed = 3,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown training status code: {0}")]
pub struct UnknownStatus(pub u8);

impl TryFrom<u8> for TrainingStatus {
    type Error = UnknownStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Running),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Failed),
            other => Err(UnknownStatus(other)),
        }
    }
}

impl From<TrainingStatus> for u8 {
    fn from(status: TrainingStatus) -> Self {
        status as u8
    }
}

impl TrainingStatus {
    /// `Completed` or `Failed`; no further transition is expected
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// `Pending` or `Running`
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` is allowed
    ///
    /// Staying put is allowed; going backwards or leaving a terminal state is not.
    pub fn can_advance_to(self, next: TrainingStatus) -> bool {
        if self.is_terminal() {
            return self == next;
        }
        next >= self
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Tracked training run, as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub id: RequestId,
    pub status: TrainingStatus,
    /// Fraction in `[0, 1]`; only meaningful while the request is active
    #[serde(default)]
    pub progress: f64,
    #[serde(default, deserialize_with = "super::de::nullable_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::de::nullable_string")]
    pub error_message: Option<String>,
}

impl TrainingRequest {
    /// Progress as a whole percentage, clamped to `0..=100`
    pub fn percent(&self) -> u8 {
        (self.progress.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
