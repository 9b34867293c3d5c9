//! Common test helper functions shared across test modules.
//!
//! This module provides reusable utilities for creating test fixtures:
//! workflow runs for mocked forges and throwaway git repositories for the
//! local forge.
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tempfile::TempDir;

use crate::forge::request::{RunStatus, WorkflowRun};

/// Creates a workflow run created `created_offset_secs` seconds after a fixed
/// base time.
///
/// # Example
/// ```ignore
/// let run =
///     workflow_run(1, "abc123", RunStatus::Completed, Some("success"), 0);
/// ```
pub fn workflow_run(
    id: u64,
    head_sha: &str,
    status: RunStatus,
    conclusion: Option<&str>,
    created_offset_secs: i64,
) -> WorkflowRun {
    let base = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    WorkflowRun {
        id,
        name: "On Release".into(),
        display_title: format!("run {id}"),
        head_sha: head_sha.to_string(),
        status,
        conclusion: conclusion.map(String::from),
        created_at: base + Duration::seconds(created_offset_secs),
    }
}

/// Initializes an empty repository in a temporary directory.
pub fn init_repo() -> (TempDir, git2::Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = git2::Repository::init(dir.path()).unwrap();
    (dir, repo)
}

/// Writes `content` to `name` and commits it on HEAD, returning the new
/// commit sha.
pub fn commit_file(
    repo: &git2::Repository,
    name: &str,
    content: &str,
) -> String {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("test", "test@example.com").unwrap();

    let parent = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, name, &tree, &parents)
        .unwrap();

    oid.to_string()
}
