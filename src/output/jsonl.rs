//! Newline-delimited JSON output for chunk records.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ChunkerError, Result};
use crate::types::Chunk;

/// Write one JSON record per line to `path`, replacing any existing file.
///
/// Returns the number of records written.
pub fn write_jsonl(path: &Path, chunks: &[Chunk]) -> Result<usize> {
    let file = File::create(path).map_err(|e| ChunkerError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for chunk in chunks {
        serde_json::to_writer(&mut writer, chunk)?;
        writer.write_all(b"\n").map_err(|e| ChunkerError::io(path, e))?;
    }
    writer.flush().map_err(|e| ChunkerError::io(path, e))?;

    debug!(path = %path.display(), records = chunks.len(), "Wrote JSONL");
    Ok(chunks.len())
}

/// Read all records from a JSONL file.
pub fn read_jsonl(path: &Path) -> Result<Vec<Chunk>> {
    let content = fs::read_to_string(path).map_err(|e| ChunkerError::io(path, e))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ChunkerError::from))
        .collect()
}

/// Concatenate existing JSONL files into `out`, skipping missing inputs.
///
/// Records keep their input order and `chunk_id` is renumbered from zero
/// across the combined file. Returns the number of input files included.
pub fn combine_jsonl<P: AsRef<Path>>(out: &Path, inputs: &[P]) -> Result<usize> {
    let mut combined = Vec::new();
    let mut included = 0;

    for input in inputs {
        let input = input.as_ref();
        if !input.exists() {
            continue;
        }
        combined.extend(read_jsonl(input)?);
        included += 1;
    }

    for (i, chunk) in combined.iter_mut().enumerate() {
        chunk.chunk_id = i;
    }
    write_jsonl(out, &combined)?;

    info!(
        path = %out.display(),
        files = included,
        records = combined.len(),
        "Combined JSONL files"
    );
    Ok(included)
}
