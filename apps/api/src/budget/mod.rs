// Length Budget Engine: exact token counting, token-preserving truncation,
// character clamping and the interleaved fixed-point pass that enforces both.
// Pure CPU work, no LLM calls.

pub mod clamp;
pub mod limits;
pub mod tokens;

pub use clamp::char_len;
pub use limits::{apply_output_limits, OutputLimits};
pub use tokens::TokenCounter;
