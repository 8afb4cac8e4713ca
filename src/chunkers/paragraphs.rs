//! Paragraph-level fallback for blocks that exceed the token ceiling.

use lazy_static::lazy_static;
use regex::Regex;

use super::base::TokenEstimator;

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\n+").unwrap();
}

/// Split an oversized block at blank lines into pieces under `max_tokens`.
///
/// Text already within budget is returned whole. Otherwise paragraphs are
/// packed greedily; a new piece starts when the next paragraph would push
/// the running estimate over budget. A single paragraph that alone exceeds
/// the budget becomes its own oversized piece and is not split further.
/// Paragraph order is preserved and pieces are joined with one blank line.
pub fn split_at_paragraphs(text: &str, max_tokens: usize, estimator: &TokenEstimator) -> Vec<String> {
    if estimator.estimate(text) <= max_tokens {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens = 0;

    for para in PARAGRAPH_BREAK.split(text) {
        let para_tokens = estimator.estimate(para);

        if current_tokens + para_tokens > max_tokens && !current.is_empty() {
            pieces.push(current.join("\n\n"));
            current.clear();
            current_tokens = 0;
        }

        current.push(para);
        current_tokens += para_tokens;
    }

    if !current.is_empty() {
        pieces.push(current.join("\n\n"));
    }

    pieces
}
