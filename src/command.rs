//! Command execution for rcgate.
//!
//! Each subcommand validates its arguments first and only then connects to
//! the configured forge, so argument errors never reach the network.
//!
//! - **verify**: the deploy gate, RC ancestry of a release tag
//! - **wait**: block until a workflow run for a commit concludes
//! - **release** / **cleanup**: tag and release plumbing used to drive the
//!   gate end to end
use log::*;

use crate::{
    Result,
    cli::{Args, Command},
};

pub mod cleanup;
pub mod release;
pub mod types;
pub mod verify;
pub mod wait;

use types::ExitStatus;

/// Run the selected subcommand and return the status the process should exit
/// with.
pub async fn execute(args: Args) -> Result<ExitStatus> {
    let remote = args.get_remote()?;

    debug!("executing {:?}", args.command);

    match args.command {
        Command::Verify(cmd) => verify::execute(&remote, cmd).await,
        Command::Wait(cmd) => wait::execute(&remote, cmd).await,
        Command::Release(cmd) => release::execute(&remote, cmd).await,
        Command::Cleanup(cmd) => cleanup::execute(&remote, cmd).await,
    }
}
