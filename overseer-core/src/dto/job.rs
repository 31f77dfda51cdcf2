//! Recurring job control DTOs

use serde::{Deserialize, Serialize};

/// Body of stop / resume / run-now requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobControlRequest {
    pub job_name: String,
}

impl JobControlRequest {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
        }
    }
}
