//! Prompt Builder — turns a persona profile, platform and request options into the
//! system message and per-variant user prompt.
//!
//! Owns the immutable `PlatformRuleTable`; nothing here performs I/O.

use crate::generation::models::{Budget, RequestKind};
use crate::generation::platform::{Platform, PlatformRuleTable, PlatformRules};
use crate::generation::prompts::{
    DONTS_SYSTEM_TEMPLATE, EMOJIS_ALLOWED, EMOJIS_FORBIDDEN, HASHTAGS_ALLOWED,
    HASHTAGS_FORBIDDEN, OUTPUT_RULES, PERSONA_SYSTEM_TEMPLATE, PLATFORM_SYSTEM_TEMPLATE,
    POST_PROMPT_TEMPLATE, REPLY_PROMPT_TEMPLATE, STYLE_HINTS,
};
use crate::persona::PersonaProfile;

/// Inputs for one variant's base prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    pub kind: RequestKind,
    pub source_text: &'a str,
    pub platform: Platform,
    pub variant_count: usize,
    /// 1-based position of this variant in the batch.
    pub variant_index: usize,
    pub budget: Budget,
    pub include_hashtags: bool,
    pub include_emojis: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    rules: PlatformRuleTable,
}

impl PromptBuilder {
    pub fn new(rules: PlatformRuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self, platform: Platform) -> &PlatformRules {
        self.rules.rules_for(platform)
    }

    /// Persona block + platform rule block + output rules.
    pub fn build_system_message(&self, persona: &PersonaProfile, platform: Platform) -> String {
        let mut sections = vec![persona_block(persona)];

        let donts: Vec<&str> = persona
            .donts
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .collect();
        if !donts.is_empty() {
            let quoted: Vec<String> = donts.iter().map(|d| format!("\"{d}\"")).collect();
            sections.push(DONTS_SYSTEM_TEMPLATE.replace("{donts}", &quoted.join(", ")));
        }

        let rules = self
            .rules(platform)
            .style_rules
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(
            PLATFORM_SYSTEM_TEMPLATE
                .replace("{platform}", &platform.display_name().to_uppercase())
                .replace("{rules}", &rules),
        );

        sections.push(OUTPUT_RULES.to_string());
        sections.join("\n\n")
    }

    /// The base user prompt for one variant (no retry feedback, no style hint).
    pub fn build_prompt(&self, request: &PromptRequest<'_>) -> String {
        let (template, item_singular, item_plural) = match request.kind {
            RequestKind::Compose | RequestKind::BrainDump => (POST_PROMPT_TEMPLATE, "post", "posts"),
            RequestKind::Reply => (REPLY_PROMPT_TEMPLATE, "reply", "replies"),
        };
        let count = request.variant_count;

        let hashtag_instruction = if request.include_hashtags {
            HASHTAGS_ALLOWED
        } else {
            HASHTAGS_FORBIDDEN
        };
        let emoji_instruction = if request.include_emojis {
            EMOJIS_ALLOWED
        } else {
            EMOJIS_FORBIDDEN
        };

        // Source text goes in last so braces inside it are never treated as placeholders.
        template
            .replace("{count}", &count.to_string())
            .replace("{variant_noun}", pluralize(count, "variant", "variants"))
            .replace("{item_noun}", pluralize(count, item_singular, item_plural))
            .replace("{index}", &request.variant_index.to_string())
            .replace("{platform}", request.platform.display_name())
            .replace("{max_length}", &request.budget.max_length.to_string())
            .replace("{max_tokens}", &request.budget.max_tokens.to_string())
            .replace("{hashtag_instruction}", hashtag_instruction)
            .replace("{emoji_instruction}", emoji_instruction)
            .replace("{source_text}", request.source_text.trim())
    }
}

/// Style hint for a 1-based variant index; rotates over the three styles.
pub fn style_hint(variant_index: usize) -> &'static str {
    STYLE_HINTS[variant_index.saturating_sub(1) % STYLE_HINTS.len()]
}

pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

fn persona_block(persona: &PersonaProfile) -> String {
    let tone = if persona.tone.is_empty() {
        "clear".to_string()
    } else {
        persona.tone.join(", ")
    };
    let hook_patterns = if persona.hook_patterns.is_empty() {
        "any strong opener".to_string()
    } else {
        persona
            .hook_patterns
            .iter()
            .map(|h| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join("; ")
    };

    PERSONA_SYSTEM_TEMPLATE
        .replace("{persona_name}", &persona.name)
        .replace("{tone}", &tone)
        .replace("{cadence}", persona.cadence.describe())
        .replace("{hook_patterns}", &hook_patterns)
        .replace("{cta_style}", persona.cta_style.describe())
}
