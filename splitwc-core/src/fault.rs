use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::ChunkSpec;

/// How an injected failure takes the worker down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Abort after scanning, before anything is written.
    BeforeWrite,
    /// Write this many bytes of the record, then abort.
    PartialWrite(usize),
}

/// Decides whether a worker attempt fails after it has scanned its range.
pub trait FaultInjector {
    fn inject(&mut self, spec: &ChunkSpec) -> Option<Fault>;
}

/// Production default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverFail;

impl FaultInjector for NeverFail {
    fn inject(&mut self, _spec: &ChunkSpec) -> Option<Fault> {
        None
    }
}

/// Fails `percent` out of 100 attempts, always before the write.
#[derive(Debug)]
pub struct CrashRate {
    percent: u8,
    rng: StdRng,
}

impl CrashRate {
    pub fn new(percent: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { percent, rng }
    }
}

impl FaultInjector for CrashRate {
    fn inject(&mut self, _spec: &ChunkSpec) -> Option<Fault> {
        if self.percent > 0 && self.rng.random_range(0..100u8) < self.percent {
            Some(Fault::BeforeWrite)
        } else {
            None
        }
    }
}

/// Replays a fixed sequence of decisions, then stops failing.
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    plan: VecDeque<Option<Fault>>,
}

impl Scripted {
    pub fn new(plan: impl IntoIterator<Item = Option<Fault>>) -> Self {
        Self {
            plan: plan.into_iter().collect(),
        }
    }
}

impl FaultInjector for Scripted {
    fn inject(&mut self, _spec: &ChunkSpec) -> Option<Fault> {
        self.plan.pop_front().flatten()
    }
}

/// Injector for a worker process configured with `percent` and an optional seed.
pub fn from_crash_percent(percent: u8, seed: Option<u64>) -> Box<dyn FaultInjector> {
    if percent == 0 {
        Box::new(NeverFail)
    } else {
        Box::new(CrashRate::new(percent, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ChunkSpec = ChunkSpec {
        offset: 0,
        length: 10,
    };

    #[test]
    fn zero_percent_never_fires() {
        let mut inj = CrashRate::new(0, Some(1));
        assert!((0..1000).all(|_| inj.inject(&SPEC).is_none()));
    }

    #[test]
    fn same_seed_same_decisions() {
        let mut a = CrashRate::new(50, Some(42));
        let mut b = CrashRate::new(50, Some(42));
        let da: Vec<_> = (0..64).map(|_| a.inject(&SPEC)).collect();
        let db: Vec<_> = (0..64).map(|_| b.inject(&SPEC)).collect();
        assert_eq!(da, db);
        assert!(da.iter().any(Option::is_some));
        assert!(da.iter().any(Option::is_none));
    }

    #[test]
    fn scripted_runs_out_to_success() {
        let mut inj = Scripted::new([Some(Fault::BeforeWrite), None]);
        assert_eq!(inj.inject(&SPEC), Some(Fault::BeforeWrite));
        assert_eq!(inj.inject(&SPEC), None);
        assert_eq!(inj.inject(&SPEC), None);
    }
}
