//! Real child processes behind the pool, with `sh` standing in for the worker.
//!
//! `waitpid(-1)` reaps any child of the test binary, so every test here takes
//! the same lock.
#![cfg(unix)]

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use splitwc_core::pool::process::{ProcessPool, WorkerCommand};
use splitwc_core::pool::{Termination, WorkerPool};
use splitwc_core::transport::{Delivery, read_full};
use splitwc_core::{ChunkOutcome, ChunkSpec, Coordinator, Counts, RunConfig, plan};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial_guard() -> std::sync::MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// `sh -c <script>`; the pool's appended arguments land in `$@` and are ignored.
fn sh(script: &str) -> WorkerCommand {
    WorkerCommand::new("sh").arg("-c").arg(script).arg("worker")
}

fn pool(cmd: WorkerCommand, cfg: &RunConfig) -> ProcessPool {
    ProcessPool::new(cmd, Path::new("/dev/null"), cfg)
}

#[test]
fn clean_worker_delivers_through_stdout() {
    let _g = serial_guard();
    // 24 zero bytes is a valid all-zero record
    let mut p = pool(sh("head -c 24 /dev/zero"), &RunConfig::default());
    let d = p.dispatch(ChunkSpec::new(0, 10)).unwrap();
    let (id, term) = p.wait_any().unwrap();
    assert_eq!(id, d.id);
    assert_eq!(term, Termination::Exited(0));
    assert_eq!(read_full(d.transport), Delivery::Complete(Counts::ZERO));
}

#[test]
fn aborting_worker_is_signaled() {
    let _g = serial_guard();
    let mut p = pool(sh("kill -ABRT $$"), &RunConfig::default());
    let d = p.dispatch(ChunkSpec::new(0, 10)).unwrap();
    let (id, term) = p.wait_any().unwrap();
    assert_eq!(id, d.id);
    assert_eq!(term, Termination::Signaled(6));
    assert!(!term.is_normal());
}

#[test]
fn exit_code_is_reported() {
    let _g = serial_guard();
    let mut p = pool(sh("exit 3"), &RunConfig::default());
    p.dispatch(ChunkSpec::new(0, 1)).unwrap();
    let (_, term) = p.wait_any().unwrap();
    assert_eq!(term, Termination::Exited(3));
}

#[test]
fn overdue_worker_is_killed() {
    let _g = serial_guard();
    let cfg = RunConfig {
        worker_timeout: Some(Duration::from_millis(100)),
        ..Default::default()
    };
    let mut p = pool(sh("sleep 30"), &cfg);
    p.dispatch(ChunkSpec::new(0, 1)).unwrap();
    let (_, term) = p.wait_any().unwrap();
    assert_eq!(term, Termination::TimedOut);
}

#[test]
fn coordinator_marks_short_clean_exit_lost() {
    let _g = serial_guard();
    let cfg = RunConfig::default();
    let p = pool(sh("head -c 5 /dev/zero"), &cfg);
    let report = Coordinator::new(p, plan(40, 2), &cfg).unwrap().run().unwrap();
    assert_eq!(report.lost(), 2);
    assert_eq!(report.dispatches, 2);
    assert_eq!(report.total, Counts::ZERO);
}

#[test]
fn coordinator_exhausts_crashing_workers() {
    let _g = serial_guard();
    let cfg = RunConfig {
        max_retries: 2,
        ..Default::default()
    };
    let p = pool(sh("kill -KILL $$"), &cfg);
    let report = Coordinator::new(p, plan(40, 3), &cfg).unwrap().run().unwrap();
    assert_eq!(report.dispatches, 6);
    assert!(report.chunks.iter().all(|c| c.attempts == 2
        && c.outcome
            == ChunkOutcome::Exhausted {
                last: Termination::Signaled(9)
            }));
}
