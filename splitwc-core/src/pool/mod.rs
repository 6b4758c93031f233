//! Where workers come from and how their ends are observed.
//!
//! The coordinator only sees [`WorkerPool`]; [`process::ProcessPool`] backs it
//! with real child processes, tests back it with scripted in-memory workers.

#[cfg(unix)]
pub mod process;

use std::fmt;
use std::io::Read;

use crate::domain::ChunkSpec;
use crate::error::Result;

/// Identifies one dispatched attempt. For OS workers this is the pid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a worker ended, as reported by the wait-any primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    /// Killed by the pool after outliving its deadline.
    TimedOut,
}

impl Termination {
    /// Only a zero exit code is a normal termination.
    pub fn is_normal(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit code {code}"),
            Termination::Signaled(sig) => match signal_name(*sig) {
                Some(name) => write!(f, "signal {sig} ({name})"),
                None => write!(f, "signal {sig}"),
            },
            Termination::TimedOut => f.write_str("timed out"),
        }
    }
}

#[cfg(unix)]
fn signal_name(sig: i32) -> Option<&'static str> {
    nix::sys::signal::Signal::try_from(sig)
        .ok()
        .map(|s| s.as_str())
}

#[cfg(not(unix))]
fn signal_name(_sig: i32) -> Option<&'static str> {
    None
}

/// A freshly started attempt and the read end of its result channel.
#[derive(Debug)]
pub struct Dispatched<T> {
    pub id: WorkerId,
    pub transport: T,
}

pub trait WorkerPool {
    type Transport: Read;

    /// Start a worker for `spec`. The returned transport is readable at once.
    fn dispatch(&mut self, spec: ChunkSpec) -> Result<Dispatched<Self::Transport>>;

    /// Block until any outstanding worker terminates.
    fn wait_any(&mut self) -> Result<(WorkerId, Termination)>;
}
