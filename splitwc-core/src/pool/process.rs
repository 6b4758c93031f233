use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::resource::{Resource, setrlimit};
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::{Dispatched, Termination, WorkerId, WorkerPool};
use crate::config::RunConfig;
use crate::domain::ChunkSpec;
use crate::error::{Result, WcError};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Program that hosts the worker body, plus the arguments selecting it.
///
/// The pool appends `--offset O --length L --crash-percent P [--seed S] -- <input>`.
#[derive(Clone, Debug)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, a: impl Into<OsString>) -> Self {
        self.args.push(a.into());
        self
    }

    /// Re-execute the running binary with `sub` as its first argument.
    pub fn current_exe(sub: &str) -> Result<Self> {
        let exe = std::env::current_exe().map_err(WcError::Transport)?;
        Ok(Self::new(exe).arg(sub))
    }
}

/// Terminate the calling worker abnormally (SIGABRT) without leaving a core file.
pub fn abort_worker() -> ! {
    if let Err(e) = setrlimit(Resource::RLIMIT_CORE, 0, 0) {
        debug!(error = %e, "could not disable core dumps");
    }
    std::process::abort()
}

struct Live {
    // Held so the handle outlives the attempt; reaping goes through waitpid.
    _child: Child,
    deadline: Option<Instant>,
    killed: bool,
}

/// Runs every attempt as a child process whose stdout is the result channel.
pub struct ProcessPool {
    command: WorkerCommand,
    input: PathBuf,
    crash_percent: u8,
    seed: Option<u64>,
    timeout: Option<Duration>,
    live: HashMap<WorkerId, Live>,
    spawned: u64,
}

impl ProcessPool {
    pub fn new(command: WorkerCommand, input: &Path, cfg: &RunConfig) -> Self {
        Self {
            command,
            input: input.to_path_buf(),
            crash_percent: cfg.crash_percent,
            seed: cfg.seed,
            timeout: cfg.worker_timeout,
            live: HashMap::new(),
            spawned: 0,
        }
    }

    fn reaped(&mut self, pid: Pid, term: Termination) -> (WorkerId, Termination) {
        let id = WorkerId(pid.as_raw() as u32);
        match self.live.remove(&id) {
            Some(live) if live.killed => (id, Termination::TimedOut),
            Some(_) => (id, term),
            None => {
                debug!(pid = id.0, "reaped a process this pool did not start");
                (id, term)
            }
        }
    }

    fn kill_overdue(&mut self) {
        let now = Instant::now();
        for (id, live) in self.live.iter_mut() {
            let overdue = live.deadline.is_some_and(|d| now >= d);
            if overdue && !live.killed {
                warn!(pid = id.0, "worker exceeded its deadline, killing");
                match kill(Pid::from_raw(id.0 as i32), Signal::SIGKILL) {
                    Ok(()) => live.killed = true,
                    Err(e) => warn!(pid = id.0, error = %e, "kill failed"),
                }
            }
        }
    }
}

impl WorkerPool for ProcessPool {
    type Transport = ChildStdout;

    fn dispatch(&mut self, spec: ChunkSpec) -> Result<Dispatched<ChildStdout>> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .arg("--offset")
            .arg(spec.offset.to_string())
            .arg("--length")
            .arg(spec.length.to_string())
            .arg("--crash-percent")
            .arg(self.crash_percent.to_string());
        if let Some(seed) = self.seed {
            // each attempt gets its own stream, otherwise a retry repeats the crash
            cmd.arg("--seed").arg(seed.wrapping_add(self.spawned).to_string());
        }
        cmd.arg("--")
            .arg(&self.input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(WcError::Transport)?;
        let transport = child.stdout.take().ok_or_else(|| {
            WcError::Transport(std::io::Error::other("worker stdout was not captured"))
        })?;
        let id = WorkerId(child.id());
        self.spawned += 1;
        debug!(pid = id.0, offset = spec.offset, length = spec.length, "worker spawned");

        self.live.insert(
            id,
            Live {
                _child: child,
                deadline: self.timeout.map(|t| Instant::now() + t),
                killed: false,
            },
        );
        Ok(Dispatched { id, transport })
    }

    fn wait_any(&mut self) -> Result<(WorkerId, Termination)> {
        let flags = self.timeout.map(|_| WaitPidFlag::WNOHANG);
        loop {
            match waitpid(Pid::from_raw(-1), flags) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    return Ok(self.reaped(pid, Termination::Exited(code)));
                }
                Ok(WaitStatus::Signaled(pid, sig, _core)) => {
                    return Ok(self.reaped(pid, Termination::Signaled(sig as i32)));
                }
                Ok(WaitStatus::StillAlive) => {
                    self.kill_overdue();
                    thread::sleep(POLL_INTERVAL);
                }
                // stopped / continued: not a termination
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(WcError::Wait(e.to_string())),
            }
        }
    }
}
