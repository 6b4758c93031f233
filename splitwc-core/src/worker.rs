use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::container::record::{RECORD_SIZE, encode, write_record};
use crate::domain::{ChunkSpec, Counts};
use crate::error::Result;
use crate::fault::{Fault, FaultInjector};
use crate::scan::scan;

/// How the worker body ended. On `Crashed` the hosting process must abort
/// instead of exiting normally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerExit {
    Delivered(Counts),
    Crashed(Fault),
}

/// Worker body: scan `spec` of `input` and write the record to `out`.
pub fn run_worker<W: Write>(
    input: &Path,
    spec: ChunkSpec,
    injector: &mut dyn FaultInjector,
    mut out: W,
) -> Result<WorkerExit> {
    let counts = scan(input, spec)?;
    debug!(offset = spec.offset, length = spec.length, ?counts, "range scanned");

    match injector.inject(&spec) {
        None => {
            write_record(&mut out, &counts)?;
            Ok(WorkerExit::Delivered(counts))
        }
        Some(Fault::BeforeWrite) => {
            warn!(offset = spec.offset, "injected crash");
            Ok(WorkerExit::Crashed(Fault::BeforeWrite))
        }
        Some(Fault::PartialWrite(n)) => {
            let n = n.min(RECORD_SIZE - 1);
            out.write_all(&encode(&counts)[..n])?;
            out.flush()?;
            warn!(offset = spec.offset, written = n, "injected crash mid-write");
            Ok(WorkerExit::Crashed(Fault::PartialWrite(n)))
        }
    }
}
