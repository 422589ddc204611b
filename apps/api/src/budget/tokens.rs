//! Token accounting under the fixed `cl100k_base` BPE scheme.
//!
//! The counter is built once at startup and cloned into whoever needs it;
//! the underlying `CoreBPE` is shared behind an `Arc`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Outcome of `TokenCounter::truncate_to_token_limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTruncation {
    pub text: String,
    pub tokens: usize,
    pub was_truncated: bool,
}

/// Exact token counter. Cheap to clone.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TokenCounter {
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base().context("Failed to load cl100k_base tokenizer")?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    /// Number of BPE tokens in `text`. Special-token strings are counted as plain text.
    pub fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }

    /// Keeps at most `max_tokens` tokens of `text`, decoding the kept prefix back to a string.
    ///
    /// Returns the input untouched when it already fits. A token slice that ends
    /// inside a multi-byte character cannot be decoded, so the cut backs off one
    /// token at a time until the prefix decodes and re-counts within budget.
    pub fn truncate_to_token_limit(&self, text: &str, max_tokens: usize) -> TokenTruncation {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.len() <= max_tokens {
            return TokenTruncation {
                text: text.to_string(),
                tokens: tokens.len(),
                was_truncated: false,
            };
        }

        let mut keep = max_tokens;
        while keep > 0 {
            if let Ok(decoded) = self.bpe.decode(tokens[..keep].to_vec()) {
                let recount = self.count_tokens(&decoded);
                if recount <= max_tokens {
                    return TokenTruncation {
                        text: decoded,
                        tokens: recount,
                        was_truncated: true,
                    };
                }
            }
            keep -= 1;
        }

        TokenTruncation {
            text: String::new(),
            tokens: 0,
            was_truncated: true,
        }
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("scheme", &"cl100k_base")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> TokenCounter {
        TokenCounter::new().unwrap()
    }

    #[test]
    fn test_empty_text_has_zero_tokens() {
        assert_eq!(counter().count_tokens(""), 0);
    }

    #[test]
    fn test_known_cl100k_counts() {
        let c = counter();
        assert_eq!(c.count_tokens("hello world"), 2);
        assert_eq!(c.count_tokens("hello"), 1);
    }

    #[test]
    fn test_truncate_within_budget_returns_original() {
        let c = counter();
        let text = "Ship small, ship often.";
        let result = c.truncate_to_token_limit(text, 100);
        assert_eq!(result.text, text);
        assert!(!result.was_truncated);
        assert_eq!(result.tokens, c.count_tokens(text));
    }

    #[test]
    fn test_truncate_cuts_to_budget() {
        let c = counter();
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let result = c.truncate_to_token_limit(text, 5);
        assert!(result.was_truncated);
        assert!(result.tokens <= 5);
        assert!(text.starts_with(&result.text));
        assert!(!result.text.is_empty());
    }

    #[test]
    fn test_zero_budget_empties_non_empty_text() {
        let result = counter().truncate_to_token_limit("anything at all", 0);
        assert_eq!(result.text, "");
        assert_eq!(result.tokens, 0);
        assert!(result.was_truncated);
    }

    #[test]
    fn test_zero_budget_on_empty_text_is_not_a_truncation() {
        let result = counter().truncate_to_token_limit("", 0);
        assert_eq!(result.text, "");
        assert!(!result.was_truncated);
    }

    #[test]
    fn test_truncate_never_splits_multibyte_characters() {
        let c = counter();
        let text = "🦀🦀🦀🦀🦀 ünïcödé ✓✓✓ 漢字漢字漢字";
        for budget in 1..c.count_tokens(text) {
            let result = c.truncate_to_token_limit(text, budget);
            assert!(result.tokens <= budget, "budget {budget} exceeded");
            assert!(text.starts_with(&result.text));
        }
    }
}
