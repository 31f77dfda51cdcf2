//! Recurring job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of a named recurring job as reported by the backend scheduler
///
/// `name` is the only stable key; the backend guarantees no numeric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub name: String,
    pub is_running: bool,
    /// `None` when no future run is scheduled
    #[serde(default, deserialize_with = "super::de::timestamp")]
    pub next_run: Option<DateTime<Utc>>,
    /// `None` when the job has never run
    #[serde(default, deserialize_with = "super::de::timestamp")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Full job list as returned by one fetch
///
/// Always replaced wholesale; never merged with a previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobList {
    #[serde(alias = "data", default)]
    pub jobs: BTreeMap<String, JobSnapshot>,
    #[serde(default)]
    pub count: usize,
}

impl JobList {
    /// Builds a list from snapshots, keyed by job name
    pub fn from_jobs(jobs: impl IntoIterator<Item = JobSnapshot>) -> Self {
        let jobs: BTreeMap<_, _> = jobs.into_iter().map(|j| (j.name.clone(), j)).collect();
        let count = jobs.len();
        Self { jobs, count }
    }

    /// True iff at least one job is currently running
    pub fn any_running(&self) -> bool {
        self.jobs.values().any(|job| job.is_running)
    }

    pub fn get(&self, name: &str) -> Option<&JobSnapshot> {
        self.jobs.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Jobs in name order
    pub fn iter(&self) -> impl Iterator<Item = &JobSnapshot> {
        self.jobs.values()
    }
}
