//! Dispatch / collect / retry state machine.
//!
//! Each chunk moves `Pending -> Dispatched -> {Succeeded | Exhausted | Lost}`,
//! re-entering `Dispatched` on abnormal termination while attempts remain.
//! A chunk adds to the running total at most once, whatever the number of
//! attempts, and the total is a plain sum so termination order is irrelevant.
//! Once the run's dispatch ceiling is spent, a failing chunk is exhausted
//! instead of retried, so the run still ends with a report.

use std::collections::HashMap;
use std::mem;

use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::domain::{ChunkSpec, Counts};
use crate::error::{Result, WcError};
use crate::pool::{Dispatched, Termination, WorkerId, WorkerPool};
use crate::report::{ChunkOutcome, ChunkReport, RunReport};
use crate::transport::{Delivery, read_full};

/// Progress notifications handed to the caller while a run is in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEvent {
    Dispatched {
        chunk: usize,
        worker: WorkerId,
        spec: ChunkSpec,
        attempt: u32,
    },
    Succeeded {
        chunk: usize,
        worker: WorkerId,
        counts: Counts,
    },
    Retrying {
        chunk: usize,
        spec: ChunkSpec,
        cause: Termination,
        attempts: u32,
        max: u32,
    },
    Exhausted {
        chunk: usize,
        spec: ChunkSpec,
        cause: Termination,
        attempts: u32,
        /// Retries remained but the run's dispatch ceiling was reached.
        fork_ceiling: bool,
    },
    ShortRead {
        chunk: usize,
        spec: ChunkSpec,
        received: usize,
    },
}

enum Phase<T> {
    Pending,
    Dispatched { worker: WorkerId, transport: T },
    Done(ChunkOutcome),
}

struct ChunkState<T> {
    spec: ChunkSpec,
    attempts_used: u32,
    phase: Phase<T>,
}

impl<T> ChunkState<T> {
    fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }
}

pub struct Coordinator<P: WorkerPool> {
    pool: P,
    chunks: Vec<ChunkState<P::Transport>>,
    by_worker: HashMap<WorkerId, usize>,
    total: Counts,
    max_retries: u32,
    max_forks: usize,
    dispatches: usize,
}

impl<P: WorkerPool> Coordinator<P> {
    /// Fails with [`WcError::ForkCeiling`] when the plan alone needs more
    /// dispatches than the ceiling allows.
    pub fn new(pool: P, plan: Vec<ChunkSpec>, cfg: &RunConfig) -> Result<Self> {
        if plan.len() > cfg.max_forks {
            return Err(WcError::ForkCeiling {
                limit: cfg.max_forks,
            });
        }
        let chunks = plan
            .into_iter()
            .map(|spec| ChunkState {
                spec,
                attempts_used: 0,
                phase: Phase::Pending,
            })
            .collect();
        Ok(Self {
            pool,
            chunks,
            by_worker: HashMap::new(),
            total: Counts::ZERO,
            max_retries: cfg.effective_max_retries(),
            max_forks: cfg.max_forks,
            dispatches: 0,
        })
    }

    pub fn run(self) -> Result<RunReport> {
        self.run_with(|_| {})
    }

    /// Drive every chunk to a terminal state, reporting progress to `on_event`.
    pub fn run_with<F: FnMut(&RunEvent)>(mut self, mut on_event: F) -> Result<RunReport> {
        for idx in 0..self.chunks.len() {
            self.dispatch(idx, &mut on_event)?;
        }

        while self.chunks.iter().any(|c| !c.is_terminal()) {
            let (worker, term) = self.pool.wait_any()?;
            let Some(idx) = self.by_worker.remove(&worker) else {
                warn!(worker = worker.0, %term, "termination for unknown worker ignored");
                continue;
            };
            self.on_terminated(idx, worker, term, &mut on_event)?;
        }

        Ok(self.into_report())
    }

    fn dispatch<F: FnMut(&RunEvent)>(&mut self, idx: usize, on_event: &mut F) -> Result<()> {
        if self.dispatches >= self.max_forks {
            return Err(WcError::ForkCeiling {
                limit: self.max_forks,
            });
        }
        let spec = self.chunks[idx].spec;
        let Dispatched { id, transport } = self.pool.dispatch(spec)?;
        self.dispatches += 1;
        self.by_worker.insert(id, idx);

        let chunk = &mut self.chunks[idx];
        chunk.attempts_used += 1;
        chunk.phase = Phase::Dispatched {
            worker: id,
            transport,
        };
        debug!(chunk = idx, worker = id.0, attempt = chunk.attempts_used, "dispatched");
        on_event(&RunEvent::Dispatched {
            chunk: idx,
            worker: id,
            spec,
            attempt: chunk.attempts_used,
        });
        Ok(())
    }

    fn on_terminated<F: FnMut(&RunEvent)>(
        &mut self,
        idx: usize,
        worker: WorkerId,
        term: Termination,
        on_event: &mut F,
    ) -> Result<()> {
        let chunk = &mut self.chunks[idx];
        let transport = match mem::replace(&mut chunk.phase, Phase::Pending) {
            Phase::Dispatched {
                worker: current,
                transport,
            } if current == worker => transport,
            other => {
                // stale id for a chunk that has moved on
                chunk.phase = other;
                warn!(chunk = idx, worker = worker.0, "termination does not match chunk state");
                return Ok(());
            }
        };
        let spec = chunk.spec;
        let attempts = chunk.attempts_used;

        if term.is_normal() {
            match read_full(transport) {
                Delivery::Complete(counts) => {
                    self.total += counts;
                    chunk.phase = Phase::Done(ChunkOutcome::Succeeded(counts));
                    debug!(chunk = idx, ?counts, "chunk succeeded");
                    on_event(&RunEvent::Succeeded {
                        chunk: idx,
                        worker,
                        counts,
                    });
                }
                Delivery::Incomplete { received } => {
                    chunk.phase = Phase::Done(ChunkOutcome::Lost { received });
                    warn!(
                        chunk = idx,
                        offset = spec.offset,
                        received,
                        "clean exit with short result, chunk not counted"
                    );
                    on_event(&RunEvent::ShortRead {
                        chunk: idx,
                        spec,
                        received,
                    });
                }
            }
            return Ok(());
        }

        drop(transport);
        let retries_left = attempts < self.max_retries;
        let fork_ceiling = retries_left && self.dispatches >= self.max_forks;
        if retries_left && !fork_ceiling {
            info!(chunk = idx, %term, attempts, "worker failed, retrying");
            on_event(&RunEvent::Retrying {
                chunk: idx,
                spec,
                cause: term,
                attempts,
                max: self.max_retries,
            });
            self.dispatch(idx, on_event)
        } else {
            chunk.phase = Phase::Done(ChunkOutcome::Exhausted { last: term });
            if fork_ceiling {
                warn!(
                    chunk = idx,
                    offset = spec.offset,
                    attempts,
                    limit = self.max_forks,
                    "dispatch ceiling reached, chunk given up"
                );
            } else {
                warn!(chunk = idx, offset = spec.offset, attempts, "retries exhausted");
            }
            on_event(&RunEvent::Exhausted {
                chunk: idx,
                spec,
                cause: term,
                attempts,
                fork_ceiling,
            });
            Ok(())
        }
    }

    fn into_report(self) -> RunReport {
        let chunks = self
            .chunks
            .into_iter()
            .map(|c| ChunkReport {
                spec: c.spec,
                attempts: c.attempts_used,
                outcome: match c.phase {
                    Phase::Done(outcome) => outcome,
                    // run_with only returns once every chunk is terminal
                    Phase::Pending | Phase::Dispatched { .. } => ChunkOutcome::Lost { received: 0 },
                },
            })
            .collect();
        RunReport {
            total: self.total,
            chunks,
            dispatches: self.dispatches,
        }
    }
}
