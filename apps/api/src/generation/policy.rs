//! Content policy — decides whether a finished variant breaks a persona's don't-rules.
//!
//! Pluggable, trait-based. Default: `DenylistPolicy` (word-presence match, pure Rust,
//! deterministic). A semantic classifier can implement `ContentPolicy` and be swapped
//! in at startup without touching the attempt loop.

use std::collections::HashSet;

use crate::persona::PersonaProfile;

pub trait ContentPolicy: Send + Sync {
    /// Returns the don't-rules `content` violates; empty means the variant passes.
    fn variant_violates(&self, content: &str, profile: &PersonaProfile) -> Vec<String>;
}

/// Crude lexical denylist.
///
/// A rule is violated when every word of the phrase appears in the lower-cased content
/// as a standalone word, in any order. No stemming, no semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenylistPolicy;

impl ContentPolicy for DenylistPolicy {
    fn variant_violates(&self, content: &str, profile: &PersonaProfile) -> Vec<String> {
        let content_lower = content.to_lowercase();
        let content_words: HashSet<&str> = words(&content_lower).collect();

        profile
            .donts
            .iter()
            .filter(|rule| {
                let rule_lower = rule.to_lowercase();
                let mut rule_words = words(&rule_lower).peekable();
                rule_words.peek().is_some() && rule_words.all(|w| content_words.contains(w))
            })
            .cloned()
            .collect()
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
}
