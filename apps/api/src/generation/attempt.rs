//! Generation Attempt Loop — drives one variant from `Pending` to a terminal state.
//!
//! Per variant: call the model, sanitize, measure, then accept / retry with budget
//! feedback / clamp deterministically once attempts run out. A transport failure is
//! returned as `Err` and aborts the caller's batch; every other problem ends in a
//! `VariantOutcome`.

use std::fmt;

use tracing::{debug, info, warn};

use crate::budget::{apply_output_limits, char_len, TokenCounter};
use crate::errors::VariantRejection;
use crate::generation::models::Budget;
use crate::generation::prompt_builder::style_hint;
use crate::generation::prompts::{EMPTY_FEEDBACK, OVER_BUDGET_FEEDBACK_TEMPLATE};
use crate::generation::sanitizer::{sanitize, SanitizeOptions};
use crate::llm_client::{CompletionClient, CompletionOptions, CompletionRequest, LlmError};

/// Model settings shared by every attempt of a batch.
#[derive(Debug, Clone)]
pub struct AttemptSettings {
    pub model: String,
    pub temperature: f32,
    /// Total LLM calls allowed per variant, first attempt included.
    pub max_attempts: usize,
}

/// Everything one variant's loop needs that does not change between attempts.
#[derive(Debug, Clone, Copy)]
pub struct VariantContext<'a> {
    /// 1-based index within the batch.
    pub index: usize,
    pub system_message: &'a str,
    pub base_prompt: &'a str,
    pub budget: Budget,
    pub sanitize: SanitizeOptions<'a>,
}

/// Terminal result of one variant's loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantOutcome {
    /// A sanitized response fit the budget.
    Accepted {
        text: String,
        tokens: usize,
        /// The unsanitized response, kept for hook/body/CTA parsing.
        raw: String,
        attempts: usize,
    },
    /// No attempt fit; the last sanitized response was clamped.
    FallbackClamped {
        text: String,
        tokens: usize,
        /// The last attempt's sanitized text, before clamping.
        original: String,
        char_overflow: usize,
        token_overflow: usize,
        attempts: usize,
    },
    Dropped(VariantRejection),
}

/// Per-variant state, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariantState {
    Pending,
    Attempting(usize),
    Retrying(usize),
    Accepted,
    FallbackClamped,
    Dropped,
}

impl fmt::Display for VariantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantState::Pending => f.write_str("pending"),
            VariantState::Attempting(n) => write!(f, "attempting({n})"),
            VariantState::Retrying(n) => write!(f, "retrying({n})"),
            VariantState::Accepted => f.write_str("accepted"),
            VariantState::FallbackClamped => f.write_str("fallback_clamped"),
            VariantState::Dropped => f.write_str("dropped"),
        }
    }
}

fn transition(index: usize, state: VariantState) {
    debug!(variant = index, state = %state, "Variant state");
}

/// What the previous attempt looked like, for the retry prompt.
enum Feedback {
    Empty,
    OverBudget {
        chars: usize,
        tokens: usize,
        previous: String,
    },
}

impl Feedback {
    fn render(&self, budget: Budget) -> String {
        match self {
            Feedback::Empty => EMPTY_FEEDBACK.to_string(),
            Feedback::OverBudget {
                chars,
                tokens,
                previous,
            } => OVER_BUDGET_FEEDBACK_TEMPLATE
                .replace("{chars}", &chars.to_string())
                .replace("{tokens}", &tokens.to_string())
                .replace("{max_length}", &budget.max_length.to_string())
                .replace("{max_tokens}", &budget.max_tokens.to_string())
                .replace("{previous}", previous),
        }
    }
}

/// Runs the attempt loop for a single variant.
pub async fn generate_variant(
    llm: &dyn CompletionClient,
    counter: &TokenCounter,
    settings: &AttemptSettings,
    ctx: &VariantContext<'_>,
) -> Result<VariantOutcome, LlmError> {
    let max_attempts = settings.max_attempts.max(1);
    let options = CompletionOptions {
        temperature: settings.temperature,
        max_output_tokens: ctx.budget.max_tokens + ctx.budget.max_tokens / 2,
    };

    transition(ctx.index, VariantState::Pending);

    let mut feedback: Option<Feedback> = None;
    let mut last_text = String::new();

    for attempt in 1..=max_attempts {
        transition(
            ctx.index,
            if attempt == 1 {
                VariantState::Attempting(attempt)
            } else {
                VariantState::Retrying(attempt)
            },
        );

        let request = CompletionRequest {
            model: settings.model.clone(),
            prompt: compose_prompt(ctx, feedback.as_ref()),
            options,
        };
        let completion = llm.complete(&request).await?;

        let sanitized = sanitize(&completion.text, &ctx.sanitize);
        let chars = char_len(&sanitized.text);
        let tokens = counter.count_tokens(&sanitized.text);

        if sanitized.text.is_empty() {
            warn!(
                variant = ctx.index,
                attempt, "Model response was empty after sanitization"
            );
            feedback = Some(Feedback::Empty);
            last_text = sanitized.text;
            continue;
        }

        if ctx.budget.fits(chars, tokens) {
            transition(ctx.index, VariantState::Accepted);
            info!(
                variant = ctx.index,
                attempt, chars, tokens, "Variant accepted"
            );
            return Ok(VariantOutcome::Accepted {
                text: sanitized.text,
                tokens,
                raw: completion.text,
                attempts: attempt,
            });
        }

        warn!(
            variant = ctx.index,
            attempt,
            chars,
            tokens,
            max_length = ctx.budget.max_length,
            max_tokens = ctx.budget.max_tokens,
            "Variant over budget"
        );
        feedback = Some(Feedback::OverBudget {
            chars,
            tokens,
            previous: sanitized.text.clone(),
        });
        last_text = sanitized.text;
    }

    if last_text.is_empty() {
        transition(ctx.index, VariantState::Dropped);
        return Ok(VariantOutcome::Dropped(VariantRejection::EmptyContent {
            index: ctx.index,
        }));
    }

    let limited = apply_output_limits(counter, &last_text, ctx.budget.limits());
    if limited.text.trim().is_empty() {
        transition(ctx.index, VariantState::Dropped);
        return Ok(VariantOutcome::Dropped(VariantRejection::TruncatedToEmpty {
            index: ctx.index,
        }));
    }

    transition(ctx.index, VariantState::FallbackClamped);
    warn!(
        variant = ctx.index,
        attempts = max_attempts,
        char_overflow = limited.char_overflow,
        token_overflow = limited.token_overflow,
        "Attempts exhausted; clamped last response"
    );

    Ok(VariantOutcome::FallbackClamped {
        text: limited.text,
        tokens: limited.tokens,
        original: last_text,
        char_overflow: limited.char_overflow,
        token_overflow: limited.token_overflow,
        attempts: max_attempts,
    })
}

fn compose_prompt(ctx: &VariantContext<'_>, feedback: Option<&Feedback>) -> String {
    let mut prompt = format!(
        "{}\n\n{}\n{}",
        ctx.system_message,
        ctx.base_prompt,
        style_hint(ctx.index)
    );
    if let Some(feedback) = feedback {
        prompt.push_str("\n\n");
        prompt.push_str(&feedback.render(ctx.budget));
    }
    prompt
}
