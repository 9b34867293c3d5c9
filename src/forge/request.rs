use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a CI workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Queued, requested, waiting or pending: the run has not started.
    NotStarted,
    InProgress,
    Completed,
}

impl From<&str> for RunStatus {
    fn from(status: &str) -> Self {
        match status {
            "completed" => RunStatus::Completed,
            "in_progress" => RunStatus::InProgress,
            _ => RunStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone)]
/// Normalized workflow run returned from any forge.
pub struct WorkflowRun {
    pub id: u64,
    pub name: String,
    pub display_title: String,
    pub head_sha: String,
    pub status: RunStatus,
    /// Only populated once the run has completed.
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkflowRun {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

#[derive(Debug, Clone)]
/// Request to list the runs of a single workflow.
pub struct ListRunsRequest {
    /// Workflow display name or workflow file name (e.g. "onrelease.yml").
    pub workflow: String,
    /// Only return runs triggered by this commit.
    pub head_sha: String,
}

#[derive(Debug, Clone, Serialize)]
/// Request to create a release object for an existing tag.
pub struct CreateReleaseRequest {
    pub tag: String,
    pub title: String,
    pub notes: String,
    pub sha: String,
    pub prerelease: bool,
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub sha: String,
}
