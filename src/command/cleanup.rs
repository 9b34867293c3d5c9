//! Release and tag removal command.
use log::*;

use crate::{
    Result,
    cli::CleanupArgs,
    command::types::ExitStatus,
    error::GateError,
    forge::{config::Remote, factory::ForgeFactory, manager::ForgeManager},
};

pub async fn execute(remote: &Remote, args: CleanupArgs) -> Result<ExitStatus> {
    if args.tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(GateError::invalid_args("tags must not be empty"));
    }

    let forge = ForgeFactory::create(remote).await?;

    cleanup(&forge, &args.tags).await?;

    Ok(ExitStatus::Success)
}

/// Delete the release object and tag for each of `tags`. Objects that do not
/// exist are skipped.
pub async fn cleanup(forge: &ForgeManager, tags: &[String]) -> Result<()> {
    for tag in tags {
        if forge.delete_release(tag).await? {
            info!("deleted release {tag}");
        } else {
            info!("no release found for {tag}: skipping");
        }

        if forge.delete_tag(tag).await? {
            info!("deleted tag {tag}");
        } else {
            info!("tag {tag} not found: skipping");
        }
    }

    Ok(())
}
