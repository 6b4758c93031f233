use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const USAGE: &str = "usage: splitwc <# of processes> <filename> [crash percent 0-50]";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Count lines, words and characters with one crash-tolerant process per chunk",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Number of worker processes (one chunk each, at most 100)
    pub num_workers: Option<usize>,

    /// File to count
    pub input: Option<PathBuf>,

    /// Percentage of worker attempts that crash; read like `atoi`, clamped to 0..=50
    #[arg(allow_negative_numbers = true)]
    pub crash_percent: Option<String>,

    /// Anything after the crash percent is ignored
    #[arg(hide = true)]
    pub trailing: Vec<String>,

    /// Attempts per chunk before it is given up, first attempt included
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Kill and retry a worker that runs longer than this
    #[arg(long = "worker-timeout-ms")]
    pub worker_timeout_ms: Option<u64>,

    /// Seed the crash injector for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one byte range and write its 24-byte result record to stdout
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        offset: u64,
        #[arg(long)]
        length: u64,
        #[arg(long, default_value_t = 0)]
        crash_percent: u8,
        #[arg(long)]
        seed: Option<u64>,
        input: PathBuf,
    },
}
