use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use splitwc_core::config::MAX_CRASH_PERCENT;
use splitwc_core::container::record::RECORD_SIZE;
use splitwc_core::error::{Result, WcError};
use splitwc_core::fault::from_crash_percent;
use splitwc_core::pool::process::{WorkerCommand, abort_worker};
use splitwc_core::{ChunkSpec, RunConfig, RunEvent, RunReport, WorkerExit, count_file, run_worker};

use crate::presentation::cli::USAGE;

/// Sub-command the coordinator re-executes this binary with.
const WORKER_SUBCOMMAND: &str = "worker";

fn describe(chunk: usize, spec: &ChunkSpec) -> String {
    format!(
        "chunk #{chunk} ({} bytes at offset {})",
        spec.length, spec.offset
    )
}

fn print_event(ev: &RunEvent) {
    match ev {
        RunEvent::Dispatched { worker, spec, .. } => {
            println!(
                "[pid {worker}] reading {} bytes from offset {}",
                spec.length, spec.offset
            );
        }
        RunEvent::Succeeded { .. } => {}
        RunEvent::Retrying {
            chunk,
            spec,
            cause,
            attempts,
            max,
        } => {
            println!(
                "{} crashed ({cause}), retrying (attempt {} of {max})",
                describe(*chunk, spec),
                attempts + 1
            );
        }
        RunEvent::Exhausted {
            chunk,
            spec,
            cause,
            attempts,
            fork_ceiling,
        } => {
            let why = if *fork_ceiling {
                "; dispatch ceiling reached"
            } else {
                ""
            };
            println!(
                "{} failed permanently after {attempts} attempts ({cause}{why}); not counted",
                describe(*chunk, spec)
            );
        }
        RunEvent::ShortRead {
            chunk,
            spec,
            received,
        } => {
            println!(
                "{} exited cleanly but delivered {received} of {RECORD_SIZE} bytes; not counted",
                describe(*chunk, spec)
            );
        }
    }
}

fn print_report(report: &RunReport) {
    println!();
    println!("========== Final Results ================");
    println!("Total Lines : {} ", report.total.lines);
    println!("Total Words : {} ", report.total.words);
    println!("Total Characters : {} ", report.total.chars);
    println!("Failed Chunks : {} ", report.failed_chunks());
    println!("=========================================");
}

pub fn handle_count(
    num_workers: usize,
    input: PathBuf,
    crash_percent: Option<String>,
    max_retries: u32,
    worker_timeout_ms: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    let cfg = RunConfig {
        num_workers,
        crash_percent: crash_percent
            .as_deref()
            .map_or(0, RunConfig::crash_percent_from_arg),
        max_retries,
        worker_timeout: worker_timeout_ms.map(Duration::from_millis),
        seed,
        ..Default::default()
    };
    println!("CRASH RATE: {}", cfg.crash_percent);

    let worker = WorkerCommand::current_exe(WORKER_SUBCOMMAND)?;
    let report = match count_file(&input, worker, &cfg, print_event) {
        Ok(report) => report,
        Err(WcError::InputOpen { path, source }) => {
            tracing::debug!(error = %source, "input open failed");
            println!("File open error: {}", path.display());
            println!("{USAGE}");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if !report.is_complete() {
        tracing::warn!(
            exhausted = report.exhausted(),
            lost = report.lost(),
            "total is an undercount"
        );
    }
    print_report(&report);
    Ok(())
}

pub fn handle_worker(
    input: PathBuf,
    offset: u64,
    length: u64,
    crash_percent: u8,
    seed: Option<u64>,
) -> Result<()> {
    let spec = ChunkSpec::new(offset, length);
    let mut injector = from_crash_percent(crash_percent.min(MAX_CRASH_PERCENT), seed);
    let mut out = std::io::stdout().lock();
    match run_worker(&input, spec, injector.as_mut(), &mut out)? {
        WorkerExit::Delivered(_) => {
            out.flush()?;
            Ok(())
        }
        WorkerExit::Crashed(_) => abort_worker(),
    }
}
