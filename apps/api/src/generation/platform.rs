//! Platform rule table — fixed per-platform budgets, style rules and default hashtags.
//!
//! The table is an immutable value handed to `PromptBuilder::new`, so platform rules can
//! be tested (or swapped) without touching any module state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target platform. Unknown names resolve to `Twitter`, whose rules are the strictest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Platform {
    #[default]
    Twitter,
    Linkedin,
    Instagram,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
        }
    }

    /// Human-facing name used inside prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter/X",
            Platform::Linkedin => "LinkedIn",
            Platform::Instagram => "Instagram",
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Platform::Linkedin,
            "instagram" => Platform::Instagram,
            // "twitter", "x" and anything unrecognised
            _ => Platform::Twitter,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        Platform::from(value.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline knows about one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRules {
    /// Default character budget when neither the request nor the persona sets one.
    pub max_length: usize,
    /// Default token budget when the request does not set one.
    pub max_tokens: usize,
    pub style_rules: &'static [&'static str],
    /// Appended when hashtags are allowed but the model produced none.
    pub default_hashtags: &'static [&'static str],
}

/// Closed lookup of rules per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRuleTable {
    twitter: PlatformRules,
    linkedin: PlatformRules,
    instagram: PlatformRules,
}

impl PlatformRuleTable {
    pub fn new(twitter: PlatformRules, linkedin: PlatformRules, instagram: PlatformRules) -> Self {
        Self {
            twitter,
            linkedin,
            instagram,
        }
    }

    pub fn rules_for(&self, platform: Platform) -> &PlatformRules {
        match platform {
            Platform::Twitter => &self.twitter,
            Platform::Linkedin => &self.linkedin,
            Platform::Instagram => &self.instagram,
        }
    }
}

impl Default for PlatformRuleTable {
    fn default() -> Self {
        Self::new(
            PlatformRules {
                max_length: 280,
                max_tokens: 80,
                style_rules: &[
                    "One idea per post. No threads, no numbering.",
                    "Put the hook in the first line; it must work without the rest.",
                    "Plain words over jargon. Cut every filler word.",
                    "No more than two hashtags, and only at the end.",
                ],
                default_hashtags: &["#buildinpublic"],
            },
            PlatformRules {
                max_length: 3000,
                max_tokens: 750,
                style_rules: &[
                    "Open with a one-line hook that earns the \"see more\" click.",
                    "Use short paragraphs of one to three sentences.",
                    "Professional but human; first person is fine.",
                    "Close with a clear takeaway or call to action.",
                    "At most three hashtags, placed at the very end.",
                ],
                default_hashtags: &["#leadership", "#careers"],
            },
            PlatformRules {
                max_length: 2200,
                max_tokens: 550,
                style_rules: &[
                    "Write a caption, not an essay; the first line shows in the feed.",
                    "Warm, visual, conversational language.",
                    "End with a question or prompt that invites comments.",
                    "Hashtags go at the end, never mid-sentence.",
                ],
                default_hashtags: &["#creator", "#inspiration"],
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets_per_platform() {
        let table = PlatformRuleTable::default();
        let twitter = table.rules_for(Platform::Twitter);
        assert_eq!((twitter.max_length, twitter.max_tokens), (280, 80));
        let linkedin = table.rules_for(Platform::Linkedin);
        assert_eq!((linkedin.max_length, linkedin.max_tokens), (3000, 750));
        let instagram = table.rules_for(Platform::Instagram);
        assert_eq!((instagram.max_length, instagram.max_tokens), (2200, 550));
    }

    #[test]
    fn test_unknown_platform_falls_back_to_twitter() {
        assert_eq!(Platform::from("mastodon"), Platform::Twitter);
        assert_eq!(Platform::from("X"), Platform::Twitter);
        assert_eq!(Platform::from(" LinkedIn "), Platform::Linkedin);
    }

    #[test]
    fn test_platform_serde_is_lowercase_and_lenient() {
        let p: Platform = serde_json::from_str(r#""instagram""#).unwrap();
        assert_eq!(p, Platform::Instagram);
        let p: Platform = serde_json::from_str(r#""threads""#).unwrap();
        assert_eq!(p, Platform::Twitter);
        assert_eq!(serde_json::to_string(&Platform::Linkedin).unwrap(), r#""linkedin""#);
    }

    #[test]
    fn test_custom_table_is_respected() {
        let tight = PlatformRules {
            max_length: 100,
            max_tokens: 20,
            style_rules: &["Be brief."],
            default_hashtags: &[],
        };
        let table = PlatformRuleTable::new(tight.clone(), tight.clone(), tight);
        assert_eq!(table.rules_for(Platform::Linkedin).max_length, 100);
    }
}
