// splitwc_core/src/domain.rs
use std::ops::{Add, AddAssign};

/// A contiguous byte range of the input assigned to one worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkSpec {
    pub offset: u64,
    pub length: u64,
}

impl ChunkSpec {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// One past the last byte of the range.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Lines, words and characters seen in one range (or summed over many).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub lines: u64,
    pub words: u64,
    pub chars: u64,
}

impl Counts {
    pub const ZERO: Counts = Counts {
        lines: 0,
        words: 0,
        chars: 0,
    };

    pub fn new(lines: u64, words: u64, chars: u64) -> Self {
        Self {
            lines,
            words,
            chars,
        }
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(self, rhs: Counts) -> Counts {
        Counts {
            lines: self.lines + rhs.lines,
            words: self.words + rhs.words,
            chars: self.chars + rhs.chars,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, rhs: Counts) {
        *self = *self + rhs;
    }
}
