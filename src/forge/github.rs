//! Implements the Forge trait for Github
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;
use octocrab::{Octocrab, params::repos::Reference};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::GateError,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        request::{
            Commit, CreateReleaseRequest, ListRunsRequest, RunStatus,
            WorkflowRun,
        },
        traits::Forge,
    },
};

#[derive(Debug, Deserialize)]
struct GitObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
struct AnnotatedTag {
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
struct RepoTag {
    pub name: String,
    pub commit: Commit,
}

#[derive(Debug, Deserialize)]
struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowsPage {
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Deserialize)]
struct Run {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    pub head_sha: String,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RunsPage {
    pub workflow_runs: Vec<Run>,
}

#[derive(Debug, Serialize)]
struct PageQuery {
    pub per_page: u8,
    pub page: u32,
}

#[derive(Debug, Serialize)]
struct RunsQuery {
    pub head_sha: String,
    pub per_page: u8,
}

impl From<Run> for WorkflowRun {
    fn from(run: Run) -> Self {
        let status = run.status.as_deref().unwrap_or_default();
        WorkflowRun {
            id: run.id,
            name: run.name.unwrap_or_default(),
            display_title: run.display_title.unwrap_or_default(),
            head_sha: run.head_sha,
            status: RunStatus::from(status),
            conclusion: run.conclusion,
            created_at: run.created_at,
        }
    }
}

/// Whether a workflow matches by display name or by its file name under
/// `.github/workflows`.
fn workflow_matches(name: &str, path: &str, wanted: &str) -> bool {
    name == wanted
        || path == wanted
        || path.ends_with(format!("/{wanted}").as_str())
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code.as_u16() == 404
    )
}

/// GitHub forge implementation using Octocrab for API interactions with
/// tags, releases and Actions workflow runs.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub async fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_uri();
        let builder = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?;
        let instance = builder.build()?;

        let repo = instance.repos(&config.owner, &config.repo).get().await?;

        debug!(
            "connected to github repo: {}",
            repo.full_name.unwrap_or(config.path.clone())
        );

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }

    fn repo_endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_uri, self.config.owner, self.config.repo, path
        )
    }

    async fn find_workflow(&self, wanted: &str) -> Result<Workflow> {
        let endpoint = self.repo_endpoint("actions/workflows");
        let query = PageQuery {
            per_page: DEFAULT_PAGE_SIZE,
            page: 1,
        };

        let page: WorkflowsPage =
            self.instance.get(endpoint, Some(&query)).await?;

        page.workflows
            .into_iter()
            .find(|w| workflow_matches(&w.name, &w.path, wanted))
            .ok_or_else(|| GateError::WorkflowNotFound(wanted.to_string()))
    }

    async fn peel_tag_object(&self, object: GitObject) -> Result<String> {
        let mut object = object;

        // annotated tags may point at other tags; follow until a commit
        while object.kind == "tag" {
            let endpoint =
                self.repo_endpoint(&format!("git/tags/{}", object.sha));
            let tag: AnnotatedTag =
                self.instance.get(endpoint, None::<&()>).await?;
            object = tag.object;
        }

        Ok(object.sha)
    }
}

#[async_trait]
impl Forge for Github {
    fn kind(&self) -> String {
        "github".into()
    }

    fn repo_name(&self) -> String {
        self.config.repo.clone()
    }

    async fn resolve_tag(&self, tag: &str) -> Result<Option<String>> {
        let endpoint = self.repo_endpoint(&format!("git/ref/tags/{tag}"));

        let result: std::result::Result<GitRef, octocrab::Error> =
            self.instance.get(endpoint, None::<&()>).await;

        match result {
            Err(err) if is_not_found(&err) => {
                info!("no tag found for name: {tag}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
            Ok(git_ref) => {
                let sha = self.peel_tag_object(git_ref.object).await?;
                Ok(Some(sha))
            }
        }
    }

    async fn tags_for_commit(&self, sha: &str) -> Result<Vec<String>> {
        let endpoint = self.repo_endpoint("tags");
        let mut names = vec![];
        let mut page = 1;

        loop {
            let query = PageQuery {
                per_page: DEFAULT_PAGE_SIZE,
                page,
            };

            let tags: Vec<RepoTag> =
                self.instance.get(&endpoint, Some(&query)).await?;

            let count = tags.len();

            names.extend(
                tags.into_iter()
                    .filter(|t| t.commit.sha == sha)
                    .map(|t| t.name),
            );

            if count < DEFAULT_PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        debug!("found {} tags pointing at {sha}: {:?}", names.len(), names);

        Ok(names)
    }

    async fn list_workflow_runs(
        &self,
        req: ListRunsRequest,
    ) -> Result<Vec<WorkflowRun>> {
        let workflow = self.find_workflow(&req.workflow).await?;

        debug!(
            "listing runs of workflow {} ({}) for commit {}",
            workflow.name, workflow.id, req.head_sha
        );

        let path = format!("actions/workflows/{}/runs", workflow.id);
        let endpoint = self.repo_endpoint(&path);
        let query = RunsQuery {
            head_sha: req.head_sha,
            per_page: DEFAULT_PAGE_SIZE,
        };

        let page: RunsPage = self.instance.get(endpoint, Some(&query)).await?;

        Ok(page
            .workflow_runs
            .into_iter()
            .map(WorkflowRun::from)
            .collect())
    }

    async fn get_workflow_run(&self, run_id: u64) -> Result<WorkflowRun> {
        let endpoint = self.repo_endpoint(&format!("actions/runs/{run_id}"));
        let run: Run = self.instance.get(endpoint, None::<&()>).await?;
        Ok(run.into())
    }

    async fn resolve_revision(&self, revision: &str) -> Result<String> {
        let endpoint = self.repo_endpoint(&format!("commits/{revision}"));
        let commit: Commit = self.instance.get(endpoint, None::<&()>).await?;
        Ok(commit.sha)
    }

    async fn tag_commit(&self, tag_name: &str, sha: &str) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .create_ref(&Reference::Tag(tag_name.to_string()), sha)
            .await?;

        Ok(())
    }

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .create(&req.tag)
            .name(&req.title)
            .body(&req.notes)
            .target_commitish(&req.sha)
            .draft(false)
            .prerelease(req.prerelease)
            .send()
            .await?;

        Ok(())
    }

    async fn delete_release(&self, tag: &str) -> Result<bool> {
        let repos = self
            .instance
            .repos(&self.config.owner, &self.config.repo);
        let releases = repos.releases();

        let release = match releases.get_by_tag(tag).await {
            Err(err) if is_not_found(&err) => return Ok(false),
            Err(err) => return Err(err.into()),
            Ok(release) => release,
        };

        releases.delete(release.id.0).await?;

        Ok(true)
    }

    async fn delete_tag(&self, tag: &str) -> Result<bool> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&Reference::Tag(tag.to_string()))
            .await;

        match result {
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(err.into()),
            Ok(()) => Ok(true),
        }
    }
}
