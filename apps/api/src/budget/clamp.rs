//! Character clamping. Lengths are counted in Unicode scalar values.

const ELLIPSIS: &str = "...";

/// Character length as used for every platform limit.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Clamps `text` to `max_length` characters.
///
/// - fits → returned unchanged
/// - `max_length <= 3` → hard slice, no room for an ellipsis
/// - otherwise → first `max_length - 3` chars, trailing whitespace trimmed, then `"..."`
///
/// Idempotent: a clamped string always fits, so clamping it again is a no-op.
pub fn clamp_to_char_limit(text: &str, max_length: usize) -> String {
    if char_len(text) <= max_length {
        return text.to_string();
    }
    if max_length <= ELLIPSIS.len() {
        return text.chars().take(max_length).collect();
    }

    let head: String = text.chars().take(max_length - ELLIPSIS.len()).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}
