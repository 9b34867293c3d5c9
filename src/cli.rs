//! CLI argument parsing and forge platform configuration.
use clap::{Parser, Subcommand};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::{env, path::PathBuf, time::Duration};

use crate::{
    Result,
    error::GateError,
    forge::config::{Remote, RemoteConfig},
    poller::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, WaitOptions},
};

/// Global CLI arguments for forge configuration and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "", global = true)]
    /// GitHub repository URL (https://github.com/owner/repo).
    pub github_repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to the token in the repo URL,
    /// then the GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, global = true)]
    /// Path to a local clone. Used when no GitHub repo is given.
    pub local_repo: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Log mutating operations instead of performing them.
    pub dry_run: bool,

    #[arg(long, short, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release gate subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that a release tag was promoted from a release candidate.
    Verify(VerifyArgs),

    /// Wait for the workflow run triggered by a commit and assert its
    /// conclusion.
    Wait(WaitArgs),

    /// Tag a commit and publish a release.
    Release(ReleaseArgs),

    /// Delete releases and their tags.
    Cleanup(CleanupArgs),
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    #[arg(long)]
    /// Release tag to verify. Defaults to the tag of the release event.
    pub tag: Option<String>,

    #[arg(long, env = "GITHUB_EVENT_PATH")]
    /// Event payload of the triggering workflow run.
    pub event_path: Option<PathBuf>,

    #[arg(long, env = "GITHUB_OUTPUT")]
    /// File to append step outputs to.
    pub github_output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct WaitArgs {
    #[arg(long)]
    /// Commit SHA that triggered the workflow.
    pub commit: String,

    #[arg(long)]
    /// Workflow name or file name (e.g. onrelease.yml).
    pub workflow: String,

    #[arg(long)]
    /// Expected conclusion (success, failure, skipped, ...).
    pub expected: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    /// Seconds to wait for the workflow to start.
    pub timeout: u64,

    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    /// Seconds between checks.
    pub poll_interval: u64,

    #[arg(long)]
    /// Only match runs whose title contains this id.
    pub test_id: Option<String>,

    #[arg(long)]
    /// Message to log on success.
    pub message: Option<String>,

    #[arg(long)]
    /// Message to log when the conclusion does not match.
    pub error: Option<String>,
}

impl WaitArgs {
    pub fn options(&self) -> WaitOptions {
        WaitOptions {
            commit: self.commit.clone(),
            workflow: self.workflow.clone(),
            expected: self.expected.clone(),
            timeout: Duration::from_secs(self.timeout),
            poll_interval: Duration::from_secs(self.poll_interval),
            test_id: self.test_id.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ReleaseArgs {
    #[arg(long)]
    /// Tag to create.
    pub tag: String,

    #[arg(long)]
    /// Commit to tag. Defaults to HEAD for local repositories.
    pub sha: Option<String>,

    #[arg(long)]
    /// Release title. Defaults to the tag name.
    pub title: Option<String>,

    #[arg(long, default_value = "")]
    /// Release notes.
    pub notes: String,

    #[arg(long, default_value_t = false)]
    /// Mark the release as a prerelease.
    pub prerelease: bool,
}

#[derive(clap::Args, Debug)]
pub struct CleanupArgs {
    #[arg(long = "tag", required = true)]
    /// Tag to delete along with its release. Repeatable.
    pub tags: Vec<String>,
}

impl Args {
    /// Configure remote repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<Remote> {
        if !self.github_repo.is_empty() {
            return get_github_remote(
                &self.github_repo,
                &self.github_token,
                self.dry_run,
            );
        }

        if let Some(path) = &self.local_repo {
            return Ok(Remote::Local {
                path: path.clone(),
                dry_run: self.dry_run,
            });
        }

        Err(GateError::invalid_args(
            "must configure a remote: --github-repo or --local-repo",
        ))
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(GateError::InvalidRemoteUrl(
            "only http and https schemes are supported for repo urls".into(),
        )),
    }
}

/// Configure GitHub remote with URL parsing and token resolution.
fn get_github_remote(
    github_repo: &str,
    github_token: &str,
    dry_run: bool,
) -> Result<Remote> {
    let parsed = GitUrl::parse(github_repo)?;

    validate_scheme(parsed.scheme)?;

    let mut token = github_token.to_string();

    if token.is_empty()
        && let Some(parsed_token) = parsed.token
    {
        token = parsed_token;
    }

    if token.is_empty()
        && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
    {
        token = env_var_token;
    }

    if token.is_empty() {
        return Err(GateError::invalid_args("must set github token"));
    }

    let host = parsed.host.ok_or_else(|| {
        GateError::InvalidRemoteUrl(format!(
            "unable to parse host from github repo: {github_repo}"
        ))
    })?;

    let owner = parsed.owner.ok_or_else(|| {
        GateError::InvalidRemoteUrl(format!(
            "unable to parse owner from github repo: {github_repo}"
        ))
    })?;

    let project_path = parsed
        .path
        .strip_prefix("/")
        .unwrap_or(&parsed.path)
        .to_string();

    let remote_config = RemoteConfig {
        host,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        path: project_path,
        token: SecretString::from(token),
        dry_run,
    };

    Ok(Remote::Github(remote_config))
}
