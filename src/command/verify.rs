//! Deploy gate command.
use log::*;
use std::path::Path;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{
    Result,
    cli::VerifyArgs,
    command::types::ExitStatus,
    error::GateError,
    forge::{config::Remote, factory::ForgeFactory, manager::ForgeManager},
    gate::{
        Verdict,
        event::{EventDecision, EventPayload},
        verify_release,
    },
};

/// What the gate should do with the triggering event.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    Tag(String),
    Filtered(String),
}

pub async fn execute(remote: &Remote, args: VerifyArgs) -> Result<ExitStatus> {
    let tag = match resolve_target(&args).await? {
        Target::Tag(tag) => tag,
        Target::Filtered(reason) => {
            info!("{reason}: deploy gate does not apply");
            return Ok(ExitStatus::Success);
        }
    };

    let forge = ForgeFactory::create(remote).await?;

    gate(&forge, &tag, args.github_output.as_deref()).await
}

/// Pick the tag to verify from the CLI and the release event, if any.
async fn resolve_target(args: &VerifyArgs) -> Result<Target> {
    let decision = match &args.event_path {
        Some(path) => EventPayload::load(path).await?.decision(),
        None => EventDecision::NoRelease,
    };

    match decision {
        EventDecision::Filtered { reason } => Ok(Target::Filtered(reason)),
        EventDecision::Verify { tag } => {
            Ok(Target::Tag(args.tag.clone().unwrap_or(tag)))
        }
        EventDecision::NoRelease => match &args.tag {
            Some(tag) => Ok(Target::Tag(tag.clone())),
            None => Err(GateError::invalid_args(
                "no release tag: pass --tag or run on a release event",
            )),
        },
    }
}

/// Verify `tag` and report whether deployment proceeds.
pub async fn gate(
    forge: &ForgeManager,
    tag: &str,
    github_output: Option<&Path>,
) -> Result<ExitStatus> {
    let verdict = verify_release(forge, tag).await?;

    if let Some(path) = github_output {
        write_outputs(path, &verdict).await?;
    }

    match &verdict {
        Verdict::RcDerived {
            release_tag,
            rc_tag,
            sha,
        } => {
            info!(
                "✅ {release_tag} was promoted from {rc_tag} at {sha}: deployment proceeds"
            );
            Ok(ExitStatus::Success)
        }
        Verdict::NotRcDerived { release_tag, sha } => {
            warn!(
                "❌ no release candidate of {release_tag} points at {sha}: skipping deployment"
            );
            Ok(ExitStatus::Mismatch)
        }
    }
}

/// Append step outputs in the `key=value` format GitHub Actions reads.
async fn write_outputs(path: &Path, verdict: &Verdict) -> Result<()> {
    let mut content = format!("rc_derived={}\n", verdict.is_rc_derived());

    if let Some(rc_tag) = verdict.rc_tag() {
        content.push_str(&format!("rc_tag={rc_tag}\n"));
    }

    debug!("writing step outputs to {}", path.display());

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    Ok(())
}
