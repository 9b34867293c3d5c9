use clap::{Parser, error::ErrorKind};
use log::*;
use std::process::ExitCode;

use rcgate::{
    Result,
    cli::Args,
    command::{self, types::ExitStatus},
};

fn initialize_logger(verbose: bool) -> Result<()> {
    let filter = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("rcgate")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn parse_args() -> std::result::Result<Args, ExitCode> {
    Args::try_parse().map_err(|err| {
        let status = match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                ExitStatus::Success
            }
            _ => ExitStatus::InvalidArgs,
        };

        // clap exits 2 on usage errors; 3 is ours, 2 means no run was found
        if let Err(print_err) = err.print() {
            eprintln!("failed to print usage error: {print_err}");
        }

        ExitCode::from(status)
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("failed to install error reporter: {err}");
        return ExitStatus::PlatformError.into();
    }

    let cli_args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    if let Err(err) = initialize_logger(cli_args.verbose) {
        eprintln!("failed to initialize logger: {err}");
        return ExitStatus::PlatformError.into();
    }

    match command::execute(cli_args).await {
        Ok(status) => status.into(),
        Err(err) => {
            let status = ExitStatus::from(&err);

            if status == ExitStatus::InvalidArgs {
                error!("invalid arguments: {err}");
            } else {
                error!("platform failure: {err}");
            }

            status.into()
        }
    }
}
