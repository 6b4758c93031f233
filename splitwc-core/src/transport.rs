use std::io::{ErrorKind, Read};

use tracing::debug;

use crate::container::record::{RECORD_SIZE, decode};
use crate::domain::Counts;

/// What a finished worker left in its result channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Complete(Counts),
    /// End of stream (or a read error) before a full record arrived.
    Incomplete { received: usize },
}

impl Delivery {
    pub fn counts(&self) -> Option<Counts> {
        match self {
            Delivery::Complete(c) => Some(*c),
            Delivery::Incomplete { .. } => None,
        }
    }
}

/// Block until a whole record has been read or the channel hits end of stream.
///
/// Bytes past the first record are never read.
pub fn read_full<R: Read>(mut r: R) -> Delivery {
    let mut buf = [0u8; RECORD_SIZE];
    let mut filled = 0usize;
    while filled < RECORD_SIZE {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(received = filled, error = %e, "result channel read failed");
                break;
            }
        }
    }
    if filled == RECORD_SIZE {
        Delivery::Complete(decode(&buf))
    } else {
        Delivery::Incomplete { received: filled }
    }
}
