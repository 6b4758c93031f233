#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;

pub mod container {
    pub mod record;
}

pub mod coordinator;
pub mod fault;
pub mod plan;
pub mod pool;
pub mod report;
pub mod scan;
pub mod transport;
pub mod worker;

use std::path::Path;

use crate::error::{Result, WcError};

// Re-exports: stable API surface
pub use config::RunConfig;
pub use coordinator::{Coordinator, RunEvent};
pub use domain::{ChunkSpec, Counts};
pub use plan::plan;
pub use report::{ChunkOutcome, RunReport};
pub use worker::{WorkerExit, run_worker};

/// Size of `input` in bytes, mapping failure to [`WcError::InputOpen`].
pub fn input_size(input: &Path) -> Result<u64> {
    std::fs::metadata(input)
        .and_then(|md| {
            if md.is_file() {
                Ok(md.len())
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ))
            }
        })
        .map_err(|source| WcError::InputOpen {
            path: input.to_path_buf(),
            source,
        })
}

/// Plan `input` and count it with one worker process per chunk.
#[cfg(unix)]
pub fn count_file<F: FnMut(&RunEvent)>(
    input: &Path,
    worker: pool::process::WorkerCommand,
    cfg: &RunConfig,
    on_event: F,
) -> Result<RunReport> {
    // open once up front so an unreadable input fails before anything is spawned
    std::fs::File::open(input).map_err(|source| WcError::InputOpen {
        path: input.to_path_buf(),
        source,
    })?;
    let size = input_size(input)?;
    let chunks = plan(size, cfg.effective_workers());
    tracing::info!(size, chunks = chunks.len(), "input planned");
    let pool = pool::process::ProcessPool::new(worker, input, cfg);
    Coordinator::new(pool, chunks, cfg)?.run_with(on_event)
}
