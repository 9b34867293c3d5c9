//! Workflow conclusion assertion command.
use log::*;

use crate::{
    Result,
    cli::WaitArgs,
    command::types::ExitStatus,
    forge::{config::Remote, factory::ForgeFactory, manager::ForgeManager},
    poller::{WaitOptions, WaitOutcome, await_conclusion},
};

pub async fn execute(remote: &Remote, args: WaitArgs) -> Result<ExitStatus> {
    let options = args.options();

    // reject bad arguments before connecting to the forge
    options.validate()?;

    let forge = ForgeFactory::create(remote).await?;

    assert_conclusion(
        &forge,
        &options,
        args.message.as_deref(),
        args.error.as_deref(),
    )
    .await
}

/// Wait for the run and log the result with the caller's messages.
pub async fn assert_conclusion(
    forge: &ForgeManager,
    options: &WaitOptions,
    message: Option<&str>,
    error_message: Option<&str>,
) -> Result<ExitStatus> {
    let outcome = await_conclusion(forge, options).await?;

    match &outcome {
        WaitOutcome::Matched { .. } => {
            let message = message.map(String::from).unwrap_or_else(|| {
                format!(
                    "workflow completed with expected conclusion: {}",
                    options.expected
                )
            });
            info!("✅ {message}");
        }
        WaitOutcome::Mismatch { observed, .. } => {
            let message = error_message.map(String::from).unwrap_or_else(|| {
                format!(
                    "workflow should have concluded with {}",
                    options.expected
                )
            });
            error!("❌ {message} (got {observed})");
        }
        WaitOutcome::NotFound { .. } => {
            let test_id = options
                .test_id
                .as_ref()
                .map(|id| format!(" with test id {id}"))
                .unwrap_or_default();
            error!(
                "❌ no {} run was triggered by commit {}{test_id} after {}s",
                options.workflow,
                options.commit,
                options.timeout.as_secs_f64()
            );
        }
    }

    Ok(ExitStatus::from(&outcome))
}
