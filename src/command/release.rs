//! Tag and release publication command.
use log::*;

use crate::{
    Result,
    cli::ReleaseArgs,
    command::types::ExitStatus,
    error::GateError,
    forge::{
        config::Remote, factory::ForgeFactory, manager::ForgeManager,
        request::CreateReleaseRequest,
    },
};

const LOCAL_DEFAULT_REVISION: &str = "HEAD";

pub async fn execute(remote: &Remote, args: ReleaseArgs) -> Result<ExitStatus> {
    if args.tag.trim().is_empty() {
        return Err(GateError::invalid_args("release tag must not be empty"));
    }

    let revision = match (&args.sha, remote) {
        (Some(sha), _) => sha.clone(),
        (None, Remote::Local { .. }) => LOCAL_DEFAULT_REVISION.to_string(),
        (None, Remote::Github(_)) => {
            return Err(GateError::invalid_args(
                "--sha is required when releasing on github",
            ));
        }
    };

    let forge = ForgeFactory::create(remote).await?;

    publish(&forge, &args, &revision).await?;

    Ok(ExitStatus::Success)
}

/// Tag `revision` and create a release object for the tag.
pub async fn publish(
    forge: &ForgeManager,
    args: &ReleaseArgs,
    revision: &str,
) -> Result<()> {
    let sha = forge.resolve_revision(revision).await?;

    info!("tagging {} at {sha} on {}", args.tag, forge.repo_name());
    forge.tag_commit(&args.tag, &sha).await?;

    let req = CreateReleaseRequest {
        tag: args.tag.clone(),
        title: args.title.clone().unwrap_or_else(|| args.tag.clone()),
        notes: args.notes.clone(),
        sha,
        prerelease: args.prerelease,
    };

    forge.create_release(req).await?;

    info!("published release {}", args.tag);

    Ok(())
}
