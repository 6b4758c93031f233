use std::io::{self, Write};

use crate::domain::Counts;

/// Size of one serialized [`Counts`] on the wire.
pub const RECORD_SIZE: usize = 24;

// Layout: [0..8]=lines, [8..16]=words, [16..24]=chars, all u64 little-endian.

pub fn encode(c: &Counts) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[0..8].copy_from_slice(&c.lines.to_le_bytes());
    buf[8..16].copy_from_slice(&c.words.to_le_bytes());
    buf[16..24].copy_from_slice(&c.chars.to_le_bytes());
    buf
}

#[inline]
fn le64(x: &[u8]) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(x);
    u64::from_le_bytes(b)
}

pub fn decode(buf: &[u8; RECORD_SIZE]) -> Counts {
    Counts {
        lines: le64(&buf[0..8]),
        words: le64(&buf[8..16]),
        chars: le64(&buf[16..24]),
    }
}

pub fn write_record(mut w: impl Write, c: &Counts) -> io::Result<()> {
    w.write_all(&encode(c))?;
    w.flush()
}
