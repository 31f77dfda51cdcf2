//! Data Transfer Objects for the automation backend API
//!
//! Request and response bodies exchanged with the backend. Domain snapshots
//! live in [`crate::domain`]; these types only describe the wire.

pub mod job;
pub mod model;
pub mod training;

use serde::{Deserialize, Serialize};

/// Response body that may or may not be wrapped in `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> DataEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::training::{TrainingRequest, TrainingStatus};

    #[test]
    fn test_envelope_both_shapes() {
        let wrapped: DataEnvelope<TrainingRequest> =
            serde_json::from_str(r#"{"data": {"id": 3, "status": 2, "progress": 1.0}}"#).unwrap();
        let bare: DataEnvelope<TrainingRequest> =
            serde_json::from_str(r#"{"id": 3, "status": 2, "progress": 1.0}"#).unwrap();

        assert_eq!(wrapped.into_inner().status, TrainingStatus::Completed);
        assert_eq!(bare.into_inner().id, 3);
    }
}
