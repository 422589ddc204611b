//! Combined output limits — the interleaved token/character fixed-point pass.
//!
//! Token and character limits come from different consumers (the model's quota
//! vs. the platform's post length). Clamping for one can leave the other violated
//! (the appended `"..."` costs a token), so the two passes alternate until the
//! text fits both or stops changing.

use crate::budget::clamp::{char_len, clamp_to_char_limit};
use crate::budget::tokens::TokenCounter;

/// Upper bound on alternating passes. Each pass only shrinks the text, so in
/// practice the loop settles in two or three.
const MAX_LIMIT_PASSES: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputLimits {
    pub max_tokens: Option<usize>,
    pub max_length: Option<usize>,
}

impl OutputLimits {
    pub fn new(max_length: usize, max_tokens: usize) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            max_length: Some(max_length),
        }
    }

    /// True when `chars`/`tokens` satisfy every limit that is set.
    pub fn fits(&self, chars: usize, tokens: usize) -> bool {
        self.max_length.map_or(true, |max| chars <= max)
            && self.max_tokens.map_or(true, |max| tokens <= max)
    }
}

/// Result of `apply_output_limits`.
///
/// Overflow fields carry the largest overflow seen on any pass (the input
/// included), so callers can report how far over the original text was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitedOutput {
    pub text: String,
    pub tokens: usize,
    pub was_truncated: bool,
    pub token_overflow: usize,
    pub char_overflow: usize,
}

/// Enforces both limits on `text`: token truncation first, then char clamping,
/// re-checked until stable.
pub fn apply_output_limits(
    counter: &TokenCounter,
    text: &str,
    limits: OutputLimits,
) -> LimitedOutput {
    let mut current = text.to_string();
    let mut was_truncated = false;
    let mut token_overflow = 0usize;
    let mut char_overflow = 0usize;

    for _pass in 0..MAX_LIMIT_PASSES {
        let tokens = counter.count_tokens(&current);
        let chars = char_len(&current);

        if let Some(max) = limits.max_tokens {
            token_overflow = token_overflow.max(tokens.saturating_sub(max));
        }
        if let Some(max) = limits.max_length {
            char_overflow = char_overflow.max(chars.saturating_sub(max));
        }

        if limits.fits(chars, tokens) {
            return LimitedOutput {
                text: current,
                tokens,
                was_truncated,
                token_overflow,
                char_overflow,
            };
        }

        let before_pass = current.clone();

        if let Some(max) = limits.max_tokens {
            if tokens > max {
                current = counter.truncate_to_token_limit(&current, max).text;
            }
        }
        if let Some(max) = limits.max_length {
            current = clamp_to_char_limit(&current, max);
        }

        if current == before_pass {
            break;
        }
        was_truncated = true;
    }

    // Did not settle: hard-slice characters (no ellipsis), then tokens. A token
    // prefix never has more characters than its source, so both limits hold.
    let sliced: String = match limits.max_length {
        Some(max) => current.chars().take(max).collect(),
        None => current.clone(),
    };
    let final_text = match limits.max_tokens {
        Some(max) => counter.truncate_to_token_limit(&sliced, max).text,
        None => sliced,
    };
    if final_text != text {
        was_truncated = true;
    }

    LimitedOutput {
        tokens: counter.count_tokens(&final_text),
        text: final_text,
        was_truncated,
        token_overflow,
        char_overflow,
    }
}
