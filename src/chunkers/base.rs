//! Token estimation shared by every sizing decision.

use crate::DEFAULT_CHARS_PER_TOKEN;

/// Token counter trait for sizing text.
pub trait TokenCounter: Send + Sync {
    /// Count the number of tokens in the given text.
    fn count_tokens(&self, text: &str) -> usize;
}

/// Character-ratio token estimator.
///
/// Approximates a tokenizer as `floor(chars / chars_per_token)`, where
/// `chars` counts Unicode scalar values. All budget comparisons in the
/// engine go through this estimate, never through a real tokenizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenEstimator {
    chars_per_token: f64,
}

impl TokenEstimator {
    /// Create an estimator with the given ratio.
    pub fn new(chars_per_token: f64) -> Self {
        Self { chars_per_token }
    }

    /// The characters-per-token ratio in use.
    pub fn chars_per_token(&self) -> f64 {
        self.chars_per_token
    }

    /// Estimate the token count of `text`.
    pub fn estimate(&self, text: &str) -> usize {
        (text.chars().count() as f64 / self.chars_per_token) as usize
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenCounter for TokenEstimator {
    fn count_tokens(&self, text: &str) -> usize {
        self.estimate(text)
    }
}

/// Helper function to estimate tokens with the default ratio.
pub fn estimate_tokens(text: &str) -> usize {
    lazy_static::lazy_static! {
        static ref ESTIMATOR: TokenEstimator = TokenEstimator::default();
    }
    ESTIMATOR.estimate(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_of_ratio() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefg"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(50)), 14);
        assert_eq!(estimate_tokens(&"x".repeat(10_000)), 2857);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 7 characters, 14 bytes
        assert_eq!(estimate_tokens("ααααααα"), 2);
    }

    #[test]
    fn test_monotonic_in_length() {
        let mut last = 0;
        for n in 0..200 {
            let tokens = estimate_tokens(&"y".repeat(n));
            assert!(tokens >= last);
            last = tokens;
        }
    }

    #[test]
    fn test_custom_ratio() {
        let estimator = TokenEstimator::new(4.0);
        assert_eq!(estimator.count_tokens(&"z".repeat(17)), 4);
        assert_eq!(estimator.chars_per_token(), 4.0);
    }
}
