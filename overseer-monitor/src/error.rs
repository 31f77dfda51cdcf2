//! Error types for the monitor layer

use overseer_client::ClientError;
use overseer_core::dto::training::ValidationError;
use thiserror::Error;

use crate::api::JobAction;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors surfaced by the job monitor and training tracker
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Transport failure or business error reported by the backend
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Rejected client-side; no request was sent
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The same control action is already in flight for this job
    #[error("{action} is already in progress for job \"{name}\"")]
    Busy { action: JobAction, name: String },

    /// A training request is still being tracked
    #[error("A training request is already in progress")]
    AlreadyTracking,

    /// The owning view was torn down; the result was discarded
    #[error("Monitor has been torn down")]
    TornDown,
}

impl MonitorError {
    /// Best available error string for a user-facing notification
    ///
    /// Network failures are worded as such; backend errors use the server's
    /// own message.
    pub fn detail(&self) -> String {
        match self {
            Self::Client(err) if err.is_transport() => {
                format!("Network error, backend unreachable ({})", err)
            }
            Self::Client(err) => err.detail(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_prefers_server_message() {
        let err = MonitorError::from(ClientError::api_error(400, "invalid model name"));
        assert_eq!(err.detail(), "invalid model name");
    }

    #[test]
    fn test_detail_words_network_failures() {
        let transport = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = MonitorError::from(ClientError::from(transport));
        assert!(err.detail().starts_with("Network error, backend unreachable ("));
    }

    #[test]
    fn test_detail_for_local_errors() {
        let err = MonitorError::from(ValidationError::MissingTrials);
        assert_eq!(
            err.detail(),
            "Trials number is required when auto-tune is enabled"
        );

        let err = MonitorError::Busy {
            action: JobAction::Stop,
            name: "cleanup".to_string(),
        };
        assert_eq!(err.detail(), "stop is already in progress for job \"cleanup\"");
    }
}
