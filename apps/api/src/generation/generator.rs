//! Content Generation — orchestrates the full pipeline for one request.
//!
//! Flow: validate → resolve persona → resolve budget → system message →
//!       per variant (sequential): prompt → attempt loop → assemble → content policy →
//!       aggregate into `GenerationResult`.
//!
//! Per-variant problems are absorbed into `GenerationResult.error`. An LLM transport
//! failure aborts the whole batch: `success=false`, no variants.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::budget::{char_len, TokenCounter};
use crate::errors::{AppError, VariantRejection};
use crate::generation::attempt::{generate_variant, AttemptSettings, VariantContext, VariantOutcome};
use crate::generation::models::{
    Budget, ContentVariant, GenerationRequest, GenerationResult, ResultMetadata, VariantMetadata,
};
use crate::generation::policy::ContentPolicy;
use crate::generation::prompt_builder::{PromptBuilder, PromptRequest};
use crate::generation::sanitizer::{
    cut_at_hallucination_markers, extract_hashtags, sanitize_fragment, strip_fences,
    SanitizeOptions,
};
use crate::generation::structure::{
    classify_hook, decompose_plain, parse_structure, PostParts, StructuredResponse,
};
use crate::llm_client::CompletionClient;
use crate::persona::{resolve_persona, PersonaProfile, PersonaStore};

/// Placeholder until real sentiment analysis exists.
const SENTIMENT_PLACEHOLDER: &str = "neutral";

/// Knobs for the generator, taken from `Config` at startup.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_attempts: usize,
    /// Append platform default hashtags when allowed and the model produced none.
    pub auto_hashtags: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

pub struct ContentGenerator {
    llm: Arc<dyn CompletionClient>,
    personas: Arc<dyn PersonaStore>,
    policy: Arc<dyn ContentPolicy>,
    prompts: PromptBuilder,
    tokens: TokenCounter,
    attempts: AttemptSettings,
    auto_hashtags: bool,
}

impl ContentGenerator {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        personas: Arc<dyn PersonaStore>,
        policy: Arc<dyn ContentPolicy>,
        prompts: PromptBuilder,
        tokens: TokenCounter,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            llm,
            personas,
            policy,
            prompts,
            tokens,
            attempts: AttemptSettings {
                model: settings.model,
                temperature: settings.temperature,
                max_attempts: settings.max_attempts,
            },
            auto_hashtags: settings.auto_hashtags,
        }
    }

    pub fn model(&self) -> &str {
        &self.attempts.model
    }

    /// Runs the pipeline for one request.
    ///
    /// Returns `Err` only for invalid requests. Everything after validation,
    /// including an unreachable model, is reported inside the `GenerationResult`.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, AppError> {
        request.validate()?;
        let started = Instant::now();

        let persona = resolve_persona(
            self.personas.as_ref(),
            request.persona_id.as_deref(),
            request.owner_id.as_deref(),
        )
        .await;

        let rules = self.prompts.rules(request.platform);
        let budget = Budget::resolve(&request, &persona, rules);
        let system_message = self.prompts.build_system_message(&persona, request.platform);
        let sanitize_options = SanitizeOptions {
            include_hashtags: request.include_hashtags,
            include_emojis: request.include_emojis,
            default_hashtags: if self.auto_hashtags {
                rules.default_hashtags
            } else {
                &[]
            },
            max_length: Some(budget.max_length),
        };

        info!(
            persona = %persona.id,
            platform = %request.platform,
            kind = ?request.kind,
            variants = request.variant_count,
            max_length = budget.max_length,
            max_tokens = budget.max_tokens,
            "Starting generation"
        );

        let mut variants: Vec<ContentVariant> = Vec::with_capacity(request.variant_count);
        let mut rejections: Vec<VariantRejection> = Vec::new();

        for index in 1..=request.variant_count {
            let base_prompt = self.prompts.build_prompt(&PromptRequest {
                kind: request.kind,
                source_text: &request.source_text,
                platform: request.platform,
                variant_count: request.variant_count,
                variant_index: index,
                budget,
                include_hashtags: request.include_hashtags,
                include_emojis: request.include_emojis,
            });
            let ctx = VariantContext {
                index,
                system_message: &system_message,
                base_prompt: &base_prompt,
                budget,
                sanitize: sanitize_options,
            };

            let outcome =
                match generate_variant(self.llm.as_ref(), &self.tokens, &self.attempts, &ctx).await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(variant = index, "LLM call failed, aborting batch: {e}");
                        return Ok(self.finish(
                            &persona,
                            started,
                            Vec::new(),
                            Some(e.to_string()),
                        ));
                    }
                };

            let draft = match outcome {
                VariantOutcome::Dropped(rejection) => {
                    warn!("{rejection}");
                    rejections.push(rejection);
                    continue;
                }
                VariantOutcome::Accepted {
                    text, tokens, raw, ..
                } => Draft {
                    parts: structured_parts(&raw, &sanitize_options)
                        .unwrap_or_else(|| decompose_plain(&text)),
                    content: text,
                    tokens,
                    clamp: None,
                },
                VariantOutcome::FallbackClamped {
                    text,
                    tokens,
                    original,
                    char_overflow,
                    token_overflow,
                    ..
                } => Draft {
                    parts: decompose_plain(&text),
                    clamp: (original != text).then_some(ClampRecord {
                        original,
                        char_overflow,
                        token_overflow,
                    }),
                    content: text,
                    tokens,
                },
            };
            let variant = assemble_variant(draft, request.include_hashtags);

            let violated = self.policy.variant_violates(&variant.content, &persona);
            if !violated.is_empty() {
                let rejection = VariantRejection::DenylistViolation {
                    index,
                    rules: violated,
                };
                warn!("{rejection}");
                rejections.push(rejection);
                continue;
            }

            variants.push(variant);
        }

        let error = if rejections.is_empty() {
            None
        } else {
            Some(
                rejections
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        };

        Ok(self.finish(&persona, started, variants, error))
    }

    fn finish(
        &self,
        persona: &PersonaProfile,
        started: Instant,
        variants: Vec<ContentVariant>,
        error: Option<String>,
    ) -> GenerationResult {
        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            persona = %persona.id,
            accepted = variants.len(),
            processing_time_ms,
            "Generation finished"
        );

        GenerationResult {
            success: !variants.is_empty(),
            variants,
            error,
            metadata: ResultMetadata {
                persona_used: persona.id.clone(),
                processing_time_ms,
                model: self.attempts.model.clone(),
                generated_at: Utc::now(),
            },
        }
    }
}

/// A finished variant before metadata is computed.
struct Draft {
    content: String,
    tokens: usize,
    parts: PostParts,
    clamp: Option<ClampRecord>,
}

/// What the fallback clamp changed.
struct ClampRecord {
    original: String,
    char_overflow: usize,
    token_overflow: usize,
}

fn assemble_variant(draft: Draft, include_hashtags: bool) -> ContentVariant {
    let Draft {
        content,
        tokens,
        parts,
        clamp,
    } = draft;

    let hashtags = if include_hashtags {
        extract_hashtags(&content)
    } else {
        Vec::new()
    };

    let metadata = match clamp {
        Some(clamp) => VariantMetadata {
            length: char_len(&content),
            token_length: tokens,
            sentiment: SENTIMENT_PLACEHOLDER.to_string(),
            hook_type: classify_hook(&parts.hook),
            was_truncated: true,
            original_length: Some(char_len(&clamp.original)),
            original_content: Some(clamp.original),
            over_limit: (clamp.char_overflow > 0).then_some(clamp.char_overflow),
            over_token_limit: (clamp.token_overflow > 0).then_some(clamp.token_overflow),
        },
        None => VariantMetadata {
            length: char_len(&content),
            token_length: tokens,
            sentiment: SENTIMENT_PLACEHOLDER.to_string(),
            hook_type: classify_hook(&parts.hook),
            was_truncated: false,
            original_length: None,
            original_content: None,
            over_limit: None,
            over_token_limit: None,
        },
    };

    ContentVariant {
        id: Uuid::new_v4(),
        content,
        hook: parts.hook,
        body: parts.body,
        cta: parts.cta,
        hashtags,
        metadata,
    }
}

/// Hook/body/CTA from a labelled response, cleaned with the request's policy.
fn structured_parts(raw: &str, options: &SanitizeOptions<'_>) -> Option<PostParts> {
    let text = cut_at_hallucination_markers(&strip_fences(raw));
    match parse_structure(&text) {
        StructuredResponse::Parsed { hook, body, cta, .. } => {
            let parts = PostParts {
                hook: sanitize_fragment(&hook, options),
                body: sanitize_fragment(&body, options),
                cta: sanitize_fragment(&cta, options),
            };
            (!parts.hook.is_empty() && !parts.body.is_empty()).then_some(parts)
        }
        StructuredResponse::Unstructured { .. } => None,
    }
}
