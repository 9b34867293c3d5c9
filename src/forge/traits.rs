//! Traits related to remote git forges
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{CreateReleaseRequest, ListRunsRequest, WorkflowRun},
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Short platform name used in logs ("github", "local").
    fn kind(&self) -> String;
    fn repo_name(&self) -> String;

    /// Resolve a tag to the commit it points at. Annotated tags are peeled.
    async fn resolve_tag(&self, tag: &str) -> Result<Option<String>>;
    /// Names of every tag pointing at the given commit.
    async fn tags_for_commit(&self, sha: &str) -> Result<Vec<String>>;

    async fn list_workflow_runs(
        &self,
        req: ListRunsRequest,
    ) -> Result<Vec<WorkflowRun>>;
    async fn get_workflow_run(&self, run_id: u64) -> Result<WorkflowRun>;

    /// Commit the given revision resolves to ("HEAD", a branch, a sha).
    async fn resolve_revision(&self, revision: &str) -> Result<String>;
    async fn tag_commit(&self, tag_name: &str, sha: &str) -> Result<()>;
    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()>;
    /// Returns false when no release exists for the tag.
    async fn delete_release(&self, tag: &str) -> Result<bool>;
    /// Returns false when the tag does not exist.
    async fn delete_tag(&self, tag: &str) -> Result<bool>;
}
