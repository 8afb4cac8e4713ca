//! Post-assembly repair of over-fragmented chunk lists.

use tracing::debug;

use super::base::TokenEstimator;
use crate::types::{Chunk, ChunkingConfig};

/// Merge adjacent undersized chunks without exceeding the token ceiling.
///
/// The last merged chunk acts as an accumulator. An incoming chunk is folded
/// into it when the combined estimate fits under `max_tokens` and either
///
/// * both belong to the same section and at least one is below
///   `min_tokens`, or
/// * the accumulator is below half of `min_tokens`, whatever the section.
///
/// The second case is the only way a merge crosses a section boundary. The
/// accumulator takes over the incoming chunk's section label only when the
/// incoming chunk is larger than the merged result, so a forced merge keeps
/// the label of the section it started in.
pub fn merge_small_chunks(chunks: Vec<Chunk>, config: &ChunkingConfig, estimator: &TokenEstimator) -> Vec<Chunk> {
    if chunks.len() <= 1 {
        return chunks;
    }

    let raw_count = chunks.len();
    let mut rest = chunks.into_iter();
    let mut merged: Vec<Chunk> = rest.next().into_iter().collect();

    for chunk in rest {
        let Some(prev) = merged.last_mut() else {
            break;
        };

        let can_merge = prev.tokens_est + chunk.tokens_est <= config.max_tokens;
        let same_section = prev.section == chunk.section;
        let prev_tiny = prev.tokens_est < config.min_tokens;
        let chunk_tiny = chunk.tokens_est < config.min_tokens;
        let severely_tiny = prev_tiny && prev.tokens_est < config.min_tokens / 2;

        if can_merge && ((same_section && (prev_tiny || chunk_tiny)) || severely_tiny) {
            prev.text.push_str("\n\n");
            prev.text.push_str(&chunk.text);
            prev.tokens_est = estimator.estimate(&prev.text);
            if chunk.tokens_est > prev.tokens_est {
                prev.section = chunk.section;
            }
        } else {
            merged.push(chunk);
        }
    }

    debug!(raw = raw_count, merged = merged.len(), "Merged small chunks");
    merged
}

/// Drop chunks whose estimate is below `floor` tokens.
pub fn drop_fragments(chunks: Vec<Chunk>, floor: usize) -> Vec<Chunk> {
    chunks.into_iter().filter(|c| c.tokens_est >= floor).collect()
}

/// Number chunks sequentially from zero in their current order.
pub fn assign_ids(chunks: &mut [Chunk]) {
    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.chunk_id = i;
    }
}
