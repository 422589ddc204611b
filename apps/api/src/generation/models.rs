//! Request / result shapes for the generation pipeline.
//!
//! These are the public contract of the service and serialize as camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::budget::OutputLimits;
use crate::errors::AppError;
use crate::generation::platform::{Platform, PlatformRules};
use crate::persona::PersonaProfile;

pub const MIN_VARIANTS: usize = 1;
pub const MAX_VARIANTS: usize = 5;

/// Which prompt template a request uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    #[default]
    Compose,
    BrainDump,
    Reply,
}

fn default_variant_count() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub persona_id: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub kind: RequestKind,
    pub source_text: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default = "default_variant_count")]
    pub variant_count: usize,
    /// Character budget. Platform default when absent.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Token budget. Platform default when absent.
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub include_hashtags: bool,
    #[serde(default)]
    pub include_emojis: bool,
}

impl GenerationRequest {
    /// Rejects requests the pipeline cannot honour, before any LLM call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.source_text.trim().is_empty() {
            return Err(AppError::Validation("sourceText cannot be empty".to_string()));
        }
        if !(MIN_VARIANTS..=MAX_VARIANTS).contains(&self.variant_count) {
            return Err(AppError::Validation(format!(
                "variantCount must be between {MIN_VARIANTS} and {MAX_VARIANTS}, got {}",
                self.variant_count
            )));
        }
        if self.max_length == Some(0) {
            return Err(AppError::Validation("maxLength must be positive".to_string()));
        }
        if self.max_tokens == Some(0) {
            return Err(AppError::Validation("maxTokens must be positive".to_string()));
        }
        Ok(())
    }
}

/// The dual budget every variant must meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_length: usize,
    pub max_tokens: usize,
}

impl Budget {
    /// Precedence: explicit request value > persona platform override (length only)
    /// > platform default.
    pub fn resolve(
        request: &GenerationRequest,
        persona: &PersonaProfile,
        rules: &PlatformRules,
    ) -> Self {
        let max_length = request
            .max_length
            .or_else(|| persona.max_length_override(request.platform))
            .unwrap_or(rules.max_length);
        let max_tokens = request.max_tokens.unwrap_or(rules.max_tokens);
        Self {
            max_length,
            max_tokens,
        }
    }

    pub fn fits(&self, chars: usize, tokens: usize) -> bool {
        chars <= self.max_length && tokens <= self.max_tokens
    }

    pub fn limits(&self) -> OutputLimits {
        OutputLimits::new(self.max_length, self.max_tokens)
    }
}

/// Coarse classification of a variant's opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookType {
    Question,
    Statistic,
    Story,
    Statement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetadata {
    pub length: usize,
    pub token_length: usize,
    /// Placeholder label; no sentiment analysis is performed.
    pub sentiment: String,
    pub hook_type: HookType,
    pub was_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    /// Largest character overflow seen while clamping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_limit: Option<usize>,
    /// Largest token overflow seen while clamping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_token_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVariant {
    pub id: Uuid,
    pub content: String,
    pub hook: String,
    pub body: String,
    pub cta: String,
    pub hashtags: Vec<String>,
    pub metadata: VariantMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub persona_used: String,
    /// Wall-clock milliseconds for the whole batch.
    #[serde(rename = "processingTime")]
    pub processing_time_ms: u64,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// True iff at least one variant survived validation.
    pub success: bool,
    pub variants: Vec<ContentVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: ResultMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::platform::PlatformRuleTable;
    use crate::persona::models::PlatformOverride;

    fn request(json: serde_json::Value) -> GenerationRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request(serde_json::json!({"sourceText": "ship it"}));
        assert_eq!(req.kind, RequestKind::Compose);
        assert_eq!(req.platform, Platform::Twitter);
        assert_eq!(req.variant_count, 1);
        assert!(!req.include_hashtags);
        assert!(!req.include_emojis);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_kind_parses_brain_dump() {
        let req = request(serde_json::json!({"sourceText": "x", "kind": "brain_dump"}));
        assert_eq!(req.kind, RequestKind::BrainDump);
    }

    #[test]
    fn test_validation_rejects_bad_variant_counts() {
        for count in [0, 6, 50] {
            let req = request(serde_json::json!({"sourceText": "x", "variantCount": count}));
            assert!(matches!(req.validate(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_validation_rejects_zero_budgets_and_empty_text() {
        let req = request(serde_json::json!({"sourceText": "x", "maxLength": 0}));
        assert!(req.validate().is_err());
        let req = request(serde_json::json!({"sourceText": "x", "maxTokens": 0}));
        assert!(req.validate().is_err());
        let req = request(serde_json::json!({"sourceText": "   "}));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_budget_precedence() {
        let table = PlatformRuleTable::default();
        let rules = table.rules_for(Platform::Linkedin);
        let mut persona = PersonaProfile::neutral_default();

        let req = request(serde_json::json!({"sourceText": "x", "platform": "linkedin"}));
        assert_eq!(
            Budget::resolve(&req, &persona, rules),
            Budget {
                max_length: 3000,
                max_tokens: 750
            }
        );

        persona.platform_overrides.insert(
            Platform::Linkedin,
            PlatformOverride {
                max_length: Some(1200),
            },
        );
        assert_eq!(Budget::resolve(&req, &persona, rules).max_length, 1200);

        let req = request(serde_json::json!({
            "sourceText": "x", "platform": "linkedin", "maxLength": 500, "maxTokens": 100
        }));
        assert_eq!(
            Budget::resolve(&req, &persona, rules),
            Budget {
                max_length: 500,
                max_tokens: 100
            }
        );
    }

    #[test]
    fn test_zero_persona_override_falls_back_to_platform_default() {
        let table = PlatformRuleTable::default();
        let rules = table.rules_for(Platform::Twitter);
        let mut persona = PersonaProfile::neutral_default();
        persona
            .platform_overrides
            .insert(Platform::Twitter, PlatformOverride { max_length: Some(0) });

        let req = request(serde_json::json!({"sourceText": "x", "platform": "twitter"}));
        assert_eq!(Budget::resolve(&req, &persona, rules).max_length, 280);
    }

    #[test]
    fn test_metadata_omits_absent_truncation_fields() {
        let meta = VariantMetadata {
            length: 10,
            token_length: 3,
            sentiment: "neutral".to_string(),
            hook_type: HookType::Statement,
            was_truncated: false,
            original_length: None,
            original_content: None,
            over_limit: None,
            over_token_limit: None,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["wasTruncated"], false);
        assert_eq!(json["hookType"], "statement");
        assert!(json.get("originalContent").is_none());
    }
}
