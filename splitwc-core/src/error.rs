use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File open error: {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused to set up a worker process or its result channel.
    #[error("transport setup failed: {0}")]
    Transport(#[source] std::io::Error),

    #[error("fork ceiling of {limit} dispatches exceeded")]
    ForkCeiling { limit: usize },

    #[error("waiting for workers failed: {0}")]
    Wait(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, WcError>;
