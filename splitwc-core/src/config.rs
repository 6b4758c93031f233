use std::time::Duration;

use crate::plan::MAX_CHUNKS;

/// Upper bound on worker processes spawned over a whole run.
pub const MAX_FORKS: usize = 1000;
/// Highest crash percentage the fault injector accepts.
pub const MAX_CRASH_PERCENT: u8 = 50;

#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Requested number of chunks (one worker each). Capped at [`MAX_CHUNKS`].
    pub num_workers: usize,
    /// Percentage of worker attempts that abort after scanning; 0 disables injection.
    pub crash_percent: u8,
    /// Dispatch attempts allowed per chunk, first attempt included.
    pub max_retries: u32,
    /// Global ceiling on dispatches for the run.
    pub max_forks: usize,
    /// Kill a worker that has not terminated within this bound.
    pub worker_timeout: Option<Duration>,
    /// Seed for the crash injector; workers derive their own from it.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            crash_percent: 0,
            max_retries: 3,
            max_forks: MAX_FORKS,
            worker_timeout: None,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Clamp a raw crash percentage into `[0, MAX_CRASH_PERCENT]`.
    pub fn clamp_crash_percent(raw: i64) -> u8 {
        raw.clamp(0, MAX_CRASH_PERCENT as i64) as u8
    }

    /// Read a crash percentage the way `atoi` would, then clamp it.
    ///
    /// Leading whitespace and one sign are accepted, parsing stops at the first
    /// non-digit, a string with no leading digits reads as 0, and values too
    /// large for `i64` saturate before clamping.
    pub fn crash_percent_from_arg(raw: &str) -> u8 {
        let s = raw.trim_start();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let magnitude = digits
            .bytes()
            .take_while(u8::is_ascii_digit)
            .fold(0i64, |acc, d| {
                acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
            });
        Self::clamp_crash_percent(if negative { -magnitude } else { magnitude })
    }

    pub fn effective_workers(&self) -> usize {
        self.num_workers.clamp(1, MAX_CHUNKS)
    }

    /// A chunk is always dispatched at least once.
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.max(1)
    }
}
