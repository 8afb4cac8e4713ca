//! Greedy packing of section blocks into chunks under the token ceiling.

use tracing::debug;

use super::base::TokenEstimator;
use super::blocks::split_into_blocks;
use super::paragraphs::split_at_paragraphs;
use super::sections::Section;
use crate::types::{ChapterMeta, Chunk};

/// Blocks waiting to be emitted as one chunk.
#[derive(Debug, Default)]
struct Pending<'a> {
    texts: Vec<&'a str>,
    tokens: usize,
}

impl<'a> Pending<'a> {
    fn push(&mut self, text: &'a str, tokens: usize) {
        self.texts.push(text);
        self.tokens += tokens;
    }

    fn fits(&self, tokens: usize, max_tokens: usize) -> bool {
        self.tokens + tokens <= max_tokens
    }

    /// Join the pending blocks into one text and reset.
    fn flush(&mut self) -> Option<String> {
        if self.texts.is_empty() {
            return None;
        }
        let text = self.texts.join("\n\n");
        self.texts.clear();
        self.tokens = 0;
        Some(text)
    }
}

/// Packs the blocks of each section into raw chunks.
///
/// Chunk boundaries never split a block. A block that alone exceeds the
/// ceiling is emitted through the paragraph splitter, one chunk per piece.
pub struct ChunkAssembler<'m> {
    meta: &'m ChapterMeta,
    estimator: TokenEstimator,
    max_tokens: usize,
}

impl<'m> ChunkAssembler<'m> {
    /// Create an assembler tagging chunks with the given chapter metadata.
    pub fn new(meta: &'m ChapterMeta, estimator: TokenEstimator, max_tokens: usize) -> Self {
        Self {
            meta,
            estimator,
            max_tokens,
        }
    }

    /// Assemble raw chunks for every section, in section order.
    pub fn assemble(&self, sections: &[Section<'_>]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for section in sections {
            self.assemble_section(section, &mut chunks);
        }
        chunks
    }

    fn assemble_section(&self, section: &Section<'_>, out: &mut Vec<Chunk>) {
        let label = section.label();
        let blocks = split_into_blocks(section.body);
        let mut pending = Pending::default();

        debug!(section = label, blocks = blocks.len(), "Assembling section");

        for block in &blocks {
            let block_tokens = self.estimator.estimate(block.text);

            if block_tokens > self.max_tokens {
                self.emit(pending.flush(), label, out);
                let pieces = split_at_paragraphs(block.text, self.max_tokens, &self.estimator);
                debug!(
                    section = label,
                    block_tokens,
                    pieces = pieces.len(),
                    "Block exceeds ceiling, split at paragraphs"
                );
                for piece in pieces {
                    self.emit(Some(piece), label, out);
                }
                continue;
            }

            if !pending.fits(block_tokens, self.max_tokens) {
                self.emit(pending.flush(), label, out);
            }
            pending.push(block.text, block_tokens);
        }

        self.emit(pending.flush(), label, out);
    }

    fn emit(&self, text: Option<String>, section: &str, out: &mut Vec<Chunk>) {
        if let Some(text) = text {
            let tokens_est = self.estimator.estimate(&text);
            out.push(Chunk::new(self.meta.clone(), section, text, tokens_est));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunkers::sections::parse_sections;
    use pretty_assertions::assert_eq;

    fn meta() -> ChapterMeta {
        ChapterMeta {
            book: "Test Book".to_string(),
            book_key: "test".to_string(),
            chapter: "Testing".to_string(),
            ..Default::default()
        }
    }

    fn assemble(body: &str, max_tokens: usize) -> Vec<Chunk> {
        let meta = meta();
        let sections = parse_sections(body);
        ChunkAssembler::new(&meta, TokenEstimator::default(), max_tokens).assemble(&sections)
    }

    #[test]
    fn test_empty_chapter_yields_nothing() {
        assert!(assemble("", 1536).is_empty());
    }

    #[test]
    fn test_theorem_and_proof_share_a_chunk() {
        let chunks = assemble("**Theorem.**\nStatement text.\n\n*Proof.*\nProof text.", 1536);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "**Theorem.**\nStatement text.\n\n*Proof.*\nProof text.");
        assert_eq!(chunks[0].section, "");
        assert_eq!(chunks[0].meta, meta());
    }

    #[test]
    fn test_flushes_when_budget_would_overflow() {
        // each block is 70 chars = 20 tokens
        let a = format!("**Lemma.** {}", "a".repeat(59));
        let b = format!("**Lemma.** {}", "b".repeat(59));
        let c = format!("**Lemma.** {}", "c".repeat(59));
        let body = format!("## Lemmas\n{}\n\n{}\n\n{}", a, b, c);

        let chunks = assemble(&body, 45);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n\n{}", a, b));
        assert_eq!(chunks[1].text, c);
        assert!(chunks.iter().all(|c| c.section == "Lemmas"));
        assert!(chunks.iter().all(|c| c.tokens_est <= 45));
    }

    #[test]
    fn test_oversized_block_is_split_and_bypasses_pending() {
        let small = "Short intro.";
        let big = format!("**Example.** {}\n\n{}", "x".repeat(100), "y".repeat(100));
        let tail = "**Remark.** Afterwards.";
        let body = format!("## Examples\n{}\n\n{}\n\n{}", small, big, tail);

        let chunks = assemble(&body, 35);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        assert_eq!(
            texts,
            vec![
                small.to_string(),
                format!("**Example.** {}", "x".repeat(100)),
                "y".repeat(100),
                tail.to_string(),
            ]
        );
    }

    #[test]
    fn test_block_at_exact_ceiling_is_not_split() {
        // 35 chars = exactly 10 tokens
        let block = format!("**Lemma.** {}\n\n{}", "a".repeat(10), "b".repeat(12));
        let chunks = assemble(&format!("## Lemmas\n{}", block), 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, block);
        assert_eq!(chunks[0].tokens_est, 10);
    }

    #[test]
    fn test_blocks_filling_ceiling_exactly_share_a_chunk() {
        // 14 chars = 4 tokens, 21 chars = 6 tokens
        let a = format!("**Lemma.** {}", "a".repeat(3));
        let b = format!("**Lemma.** {}", "b".repeat(10));
        let chunks = assemble(&format!("## Lemmas\n{}\n\n{}", a, b), 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, format!("{}\n\n{}", a, b));
    }

    #[test]
    fn test_single_oversized_paragraph_exceeds_budget() {
        let body = "z".repeat(10_000);
        let chunks = assemble(&body, 1536);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].tokens_est, 2857);
    }

    #[test]
    fn test_chunks_never_span_sections() {
        let body = "## One\nAlpha.\n\n## Two\nBeta.";
        let chunks = assemble(body, 1536);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section, "One");
        assert_eq!(chunks[0].text, "Alpha.");
        assert_eq!(chunks[1].section, "Two");
        assert_eq!(chunks[1].text, "Beta.");
    }
}
