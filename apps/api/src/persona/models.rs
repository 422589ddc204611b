//! Persona profile — a named voice specification used to condition generation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::generation::platform::Platform;

/// Id reported in `metadata.personaUsed` when no stored persona was found.
pub const DEFAULT_PERSONA_ID: &str = "default";

/// Desired pacing / length class of the writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Concise,
    Detailed,
    #[default]
    Conversational,
}

impl Cadence {
    pub fn describe(&self) -> &'static str {
        match self {
            Cadence::Concise => "concise: short sentences, no filler, get to the point fast",
            Cadence::Detailed => "detailed: specific examples, concrete numbers, complete reasoning",
            Cadence::Conversational => {
                "conversational: relaxed rhythm, like talking to a colleague over coffee"
            }
        }
    }
}

/// How the persona closes a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtaStyle {
    Direct,
    #[default]
    Soft,
    QuestionBased,
}

impl CtaStyle {
    pub fn describe(&self) -> &'static str {
        match self {
            CtaStyle::Direct => "direct: tell the reader exactly what to do next",
            CtaStyle::Soft => "soft: a gentle invitation, never pushy",
            CtaStyle::QuestionBased => "question-based: end with a question the reader wants to answer",
        }
    }
}

/// Per-platform override carried on a persona.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOverride {
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaProfile {
    pub id: String,
    pub name: String,
    /// Ordered tone descriptors, strongest first.
    #[serde(default)]
    pub tone: Vec<String>,
    #[serde(default)]
    pub cadence: Cadence,
    /// Banned phrases / keywords ("don't-rules").
    #[serde(default)]
    pub donts: Vec<String>,
    /// Example openers the persona likes to use.
    #[serde(default)]
    pub hook_patterns: Vec<String>,
    #[serde(default)]
    pub cta_style: CtaStyle,
    #[serde(default)]
    pub platform_overrides: HashMap<Platform, PlatformOverride>,
}

impl PersonaProfile {
    /// The neutral profile synthesized when a persona lookup misses.
    pub fn neutral_default() -> Self {
        Self {
            id: DEFAULT_PERSONA_ID.to_string(),
            name: "Default Voice".to_string(),
            tone: vec!["clear".to_string(), "friendly".to_string()],
            cadence: Cadence::Conversational,
            donts: vec![],
            hook_patterns: vec![],
            cta_style: CtaStyle::Soft,
            platform_overrides: HashMap::new(),
        }
    }

    /// A zero override is ignored so the platform default applies.
    pub fn max_length_override(&self, platform: Platform) -> Option<usize> {
        self.platform_overrides
            .get(&platform)
            .and_then(|o| o.max_length)
            .filter(|&n| n > 0)
    }
}
