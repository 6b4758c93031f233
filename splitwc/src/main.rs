mod application;

mod presentation {
    pub mod cli;
}

use splitwc_core::error::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    // stderr only: a worker's stdout is its result channel
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("SPLITWC_LOG").unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    application::run()
}
