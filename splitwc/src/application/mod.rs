pub mod handlers;

use crate::presentation::cli::{Cli, Commands, USAGE};
use clap::Parser;
use clap::error::ErrorKind;
use splitwc_core::error::Result;

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // malformed invocations are reported but are not a failure exit
            tracing::debug!(error = %e, "argument parsing failed");
            println!("{USAGE}");
            return Ok(());
        }
    };

    if !cli.trailing.is_empty() {
        tracing::debug!(ignored = ?cli.trailing, "extra arguments ignored");
    }

    match cli.command {
        Some(Commands::Worker {
            offset,
            length,
            crash_percent,
            seed,
            input,
        }) => handlers::handle_worker(input, offset, length, crash_percent, seed),
        None => match (cli.num_workers, cli.input) {
            (Some(num_workers), Some(input)) if num_workers > 0 => handlers::handle_count(
                num_workers,
                input,
                cli.crash_percent,
                cli.max_retries,
                cli.worker_timeout_ms,
                cli.seed,
            ),
            _ => {
                println!("{USAGE}");
                Ok(())
            }
        },
    }
}
