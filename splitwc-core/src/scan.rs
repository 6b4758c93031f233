use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::domain::{ChunkSpec, Counts};
use crate::error::{Result, WcError};

/// Count the bytes of `r`.
///
/// Space and newline each close a word; newline also closes a line; every
/// other byte is a character. A final word with no terminator is not counted.
pub fn scan_reader<R: Read>(mut r: R) -> std::io::Result<Counts> {
    let mut counts = Counts::ZERO;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match r.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        for &b in &buf[..n] {
            match b {
                b'\n' => {
                    counts.words += 1;
                    counts.lines += 1;
                }
                b' ' => counts.words += 1,
                _ => counts.chars += 1,
            }
        }
    }
    Ok(counts)
}

/// Open `input` independently and count the bytes in `spec`.
///
/// Reading stops early at end of file, so a range past EOF is short, not an error.
pub fn scan(input: &Path, spec: ChunkSpec) -> Result<Counts> {
    if spec.length == 0 {
        return Ok(Counts::ZERO);
    }
    let mut f = File::open(input).map_err(|source| WcError::InputOpen {
        path: input.to_path_buf(),
        source,
    })?;
    f.seek(SeekFrom::Start(spec.offset))?;
    Ok(scan_reader(BufReader::new(f).take(spec.length))?)
}
