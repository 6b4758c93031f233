use crate::domain::ChunkSpec;

/// Most chunks (and therefore concurrent workers) a run will plan.
pub const MAX_CHUNKS: usize = 100;

/// Split `[0, file_size)` into `num_chunks` contiguous ranges.
///
/// The first `file_size % n` chunks are one byte longer than the rest, so no
/// two lengths differ by more than one. Requests above [`MAX_CHUNKS`] are
/// truncated to it; a request for zero chunks plans a single chunk. When there
/// are more chunks than bytes the excess chunks have length 0.
pub fn plan(file_size: u64, num_chunks: usize) -> Vec<ChunkSpec> {
    let n = num_chunks.clamp(1, MAX_CHUNKS) as u64;
    let base = file_size / n;
    let remainder = file_size % n;

    let mut out = Vec::with_capacity(n as usize);
    let mut offset = 0u64;
    for i in 0..n {
        let length = if i < remainder { base + 1 } else { base };
        out.push(ChunkSpec::new(offset, length));
        offset += length;
    }
    out
}
