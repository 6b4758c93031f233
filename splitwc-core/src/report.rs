use crate::domain::{ChunkSpec, Counts};
use crate::pool::Termination;

/// Terminal state of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    Succeeded(Counts),
    /// Every allowed attempt terminated abnormally; `last` is the final one.
    Exhausted { last: Termination },
    /// The worker exited cleanly without delivering a full record.
    Lost { received: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkReport {
    pub spec: ChunkSpec,
    pub attempts: u32,
    pub outcome: ChunkOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total: Counts,
    /// In plan order.
    pub chunks: Vec<ChunkReport>,
    pub dispatches: usize,
}

impl RunReport {
    pub fn exhausted(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c.outcome, ChunkOutcome::Exhausted { .. }))
            .count()
    }

    pub fn lost(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| matches!(c.outcome, ChunkOutcome::Lost { .. }))
            .count()
    }

    /// Chunks that contributed nothing to the total.
    pub fn failed_chunks(&self) -> usize {
        self.exhausted() + self.lost()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_chunks() == 0
    }
}
