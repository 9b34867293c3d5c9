//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    forge::{
        request::{CreateReleaseRequest, ListRunsRequest, WorkflowRun},
        traits::Forge,
    },
};

/// Forge wrapper that logs platform calls and short-circuits mutating
/// operations in dry-run mode.
pub struct ForgeManager {
    forge: Box<dyn Forge>,
    dry_run: bool,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, dry_run: bool) -> Self {
        Self { forge, dry_run }
    }

    pub fn repo_name(&self) -> String {
        self.forge.repo_name()
    }

    pub async fn resolve_tag(&self, tag: &str) -> Result<Option<String>> {
        debug!("resolving tag {tag}");
        self.forge.resolve_tag(tag).await
    }

    pub async fn tags_for_commit(&self, sha: &str) -> Result<Vec<String>> {
        self.forge.tags_for_commit(sha).await
    }

    pub async fn list_workflow_runs(
        &self,
        req: ListRunsRequest,
    ) -> Result<Vec<WorkflowRun>> {
        debug!(
            "listing runs of workflow {} for commit {}",
            req.workflow, req.head_sha
        );
        self.forge.list_workflow_runs(req).await
    }

    pub async fn get_workflow_run(&self, run_id: u64) -> Result<WorkflowRun> {
        self.forge.get_workflow_run(run_id).await
    }

    pub async fn resolve_revision(&self, revision: &str) -> Result<String> {
        self.forge.resolve_revision(revision).await
    }

    pub async fn tag_commit(&self, tag_name: &str, sha: &str) -> Result<()> {
        if self.dry_run {
            warn!(
                "dry_run: would tag commit: tag_name: {tag_name}, sha: {sha}"
            );
            return Ok(());
        }

        self.forge.tag_commit(tag_name, sha).await
    }

    pub async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<()> {
        if self.dry_run {
            warn!("dry_run: would create release: req: {:#?}", req);
            return Ok(());
        }

        self.forge.create_release(req).await
    }

    pub async fn delete_release(&self, tag: &str) -> Result<bool> {
        if self.dry_run {
            warn!("dry_run: would delete release for tag: {tag}");
            return Ok(false);
        }

        self.forge.delete_release(tag).await
    }

    pub async fn delete_tag(&self, tag: &str) -> Result<bool> {
        if self.dry_run {
            warn!("dry_run: would delete tag: {tag}");
            return Ok(false);
        }

        self.forge.delete_tag(tag).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::traits::MockForge;

    #[tokio::test]
    async fn dry_run_skips_mutating_calls() {
        let mut mock_forge = MockForge::new();
        mock_forge.expect_tag_commit().never();
        mock_forge.expect_create_release().never();
        mock_forge.expect_delete_release().never();
        mock_forge.expect_delete_tag().never();

        let manager = ForgeManager::new(Box::new(mock_forge), true);

        manager.tag_commit("v1.0.0", "abc123").await.unwrap();
        manager
            .create_release(CreateReleaseRequest {
                tag: "v1.0.0".into(),
                title: "v1.0.0".into(),
                notes: "".into(),
                sha: "abc123".into(),
                prerelease: false,
            })
            .await
            .unwrap();
        assert!(!manager.delete_release("v1.0.0").await.unwrap());
        assert!(!manager.delete_tag("v1.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn forwards_mutating_calls_when_not_dry_run() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_tag_commit()
            .times(1)
            .withf(|tag, sha| tag == "v1.0.0" && sha == "abc123")
            .returning(|_, _| Ok(()));

        let manager = ForgeManager::new(Box::new(mock_forge), false);

        manager.tag_commit("v1.0.0", "abc123").await.unwrap();
    }

    #[tokio::test]
    async fn reads_are_forwarded_in_dry_run() {
        let mut mock_forge = MockForge::new();
        mock_forge
            .expect_resolve_tag()
            .times(1)
            .returning(|_| Ok(Some("abc123".into())));

        let manager = ForgeManager::new(Box::new(mock_forge), true);

        assert_eq!(
            manager.resolve_tag("v1.0.0").await.unwrap(),
            Some("abc123".into())
        );
    }
}
