//! Local forge implementation backed by a git2 repository on disk.
//!
//! Tag lookups and tag creation operate on the local clone. The local forge
//! has no CI system and no release objects: workflow queries are rejected and
//! release operations are logged only.
use async_trait::async_trait;
use color_eyre::eyre::OptionExt;
use log::*;
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;

use crate::{
    Result,
    error::GateError,
    forge::{
        request::{CreateReleaseRequest, ListRunsRequest, WorkflowRun},
        traits::Forge,
    },
};

/// LocalRepo forge implementation using git2.
pub struct LocalRepo {
    repo_name: String,
    repo: Arc<Mutex<git2::Repository>>,
}

impl LocalRepo {
    pub fn new(repo_path: &Path) -> Result<Self> {
        let mut repo_path_buf = repo_path.to_path_buf();

        if repo_path == Path::new(".") || repo_path == Path::new("./") {
            repo_path_buf = env::current_dir()?;
        }

        let repo = git2::Repository::open(&repo_path_buf)?;

        let repo_name = workdir_name(&repo, &repo_path_buf)?;

        Ok(Self {
            repo_name,
            repo: Arc::new(Mutex::new(repo)),
        })
    }
}

fn workdir_name(repo: &git2::Repository, fallback: &Path) -> Result<String> {
    let dir: PathBuf = repo
        .workdir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());

    let name = dir
        .file_name()
        .ok_or_eyre("unable to determine repository directory name from path")?
        .to_string_lossy()
        .to_string();

    Ok(name)
}

#[async_trait]
impl Forge for LocalRepo {
    fn kind(&self) -> String {
        "local".into()
    }

    fn repo_name(&self) -> String {
        self.repo_name.clone()
    }

    async fn resolve_tag(&self, tag: &str) -> Result<Option<String>> {
        let repo = self.repo.lock().await;

        let reference = match repo.find_reference(&format!("refs/tags/{tag}"))
        {
            Ok(reference) => reference,
            Err(err) if err.code() == git2::ErrorCode::NotFound => {
                info!("no tag found for name: {tag}");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let commit = reference.peel_to_commit()?;

        Ok(Some(commit.id().to_string()))
    }

    async fn tags_for_commit(&self, sha: &str) -> Result<Vec<String>> {
        let repo = self.repo.lock().await;
        let target = git2::Oid::from_str(sha)?;

        let mut names = vec![];

        for name in repo.tag_names(None)?.iter().flatten() {
            let reference = repo.find_reference(&format!("refs/tags/{name}"))?;

            // tags pointing at trees or blobs cannot be siblings of a commit
            match reference.peel_to_commit() {
                Ok(commit) if commit.id() == target => {
                    names.push(name.to_string())
                }
                Ok(_) => {}
                Err(err) => debug!("skipping tag {name}: {err}"),
            }
        }

        debug!("found {} tags pointing at {sha}: {:?}", names.len(), names);

        Ok(names)
    }

    async fn list_workflow_runs(
        &self,
        _req: ListRunsRequest,
    ) -> Result<Vec<WorkflowRun>> {
        Err(GateError::unsupported(self.kind(), "list workflow runs"))
    }

    async fn get_workflow_run(&self, _run_id: u64) -> Result<WorkflowRun> {
        Err(GateError::unsupported(self.kind(), "get workflow run"))
    }

    async fn resolve_revision(&self, revision: &str) -> Result<String> {
        let repo = self.repo.lock().await;
        let commit = repo.revparse_single(revision)?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    async fn tag_commit(&self, tag_name: &str, sha: &str) -> Result<()> {
        let repo = self.repo.lock().await;
        let object = repo.find_object(git2::Oid::from_str(sha)?, None)?;
        repo.tag_lightweight(tag_name, &object, false)?;
        info!("created local tag {tag_name} at {sha}");
        Ok(())
    }

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        warn!("local_mode: would create release: req: {:#?}", req);
        Ok(())
    }

    async fn delete_release(&self, tag: &str) -> Result<bool> {
        warn!("local_mode: would delete release for tag: {tag}");
        Ok(false)
    }

    async fn delete_tag(&self, tag: &str) -> Result<bool> {
        let repo = self.repo.lock().await;

        match repo.tag_delete(tag) {
            Ok(()) => Ok(true),
            Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
