// All LLM prompt constants for the Generation module.
// Templates use literal `{placeholder}` substitution via `str::replace`.

/// Persona block of the system message.
/// Replace: {persona_name}, {tone}, {cadence}, {hook_patterns}, {cta_style}
pub const PERSONA_SYSTEM_TEMPLATE: &str = "\
You are a ghostwriter. Write social media content in the voice of \"{persona_name}\".\n\
\n\
VOICE PROFILE:\n\
- Tone: {tone}\n\
- Cadence: {cadence}\n\
- Hook patterns this voice uses: {hook_patterns}\n\
- Call-to-action style: {cta_style}";

/// Appended to the persona block only when the persona has don't-rules.
/// Replace: {donts}
pub const DONTS_SYSTEM_TEMPLATE: &str = "\
NEVER use these words or phrases, in any form: {donts}";

/// Platform block of the system message. Replace: {platform}, {rules}
pub const PLATFORM_SYSTEM_TEMPLATE: &str = "\
{platform} RULES:\n\
{rules}";

/// Closing block shared by every system message.
pub const OUTPUT_RULES: &str = "\
OUTPUT RULES:\n\
- Return ONLY the text of the post, exactly as it should be published.\n\
- No labels such as \"Hook:\" or \"CTA:\", no surrounding quotes, no markdown.\n\
- No notes, explanations, character counts, alternatives or example replies after the post.";

/// Template for `compose` and `brain_dump` requests.
/// Replace: {source_text}, {count}, {variant_noun}, {item_noun}, {index}, {platform},
///          {max_length}, {max_tokens}, {hashtag_instruction}, {emoji_instruction}
pub const POST_PROMPT_TEMPLATE: &str = "\
IDEA (raw notes from the author, may be messy):\n\
{source_text}\n\
\n\
TASK: We are drafting {count} {variant_noun} of this idea as {item_noun} for {platform}. \
Write number {index} now: ONE {platform} post that stands apart from the other {variant_noun}.\n\
\n\
HARD LIMITS: at most {max_length} characters and {max_tokens} tokens, hashtags included.\n\
{hashtag_instruction}\n\
{emoji_instruction}";

/// Template for `reply` requests.
/// Replace: same placeholders as `POST_PROMPT_TEMPLATE`.
pub const REPLY_PROMPT_TEMPLATE: &str = "\
POST YOU ARE REPLYING TO:\n\
{source_text}\n\
\n\
TASK: We are drafting {count} {variant_noun} as {item_noun} on {platform}. \
Write number {index} now: ONE reply that adds something specific to the conversation. \
Do not restate the original post.\n\
\n\
HARD LIMITS: at most {max_length} characters and {max_tokens} tokens, hashtags included.\n\
{hashtag_instruction}\n\
{emoji_instruction}";

pub const HASHTAGS_ALLOWED: &str = "Include 1-2 relevant hashtags only when useful.";
pub const HASHTAGS_FORBIDDEN: &str = "Do not include hashtags.";
pub const EMOJIS_ALLOWED: &str = "Use emojis sparingly, at most two.";
pub const EMOJIS_FORBIDDEN: &str = "Do not use emojis.";

/// Style hints rotated across variants (index mod 3) to diversify a batch.
pub const STYLE_HINTS: [&str; 3] = [
    "STYLE: Open by asking a question the reader cannot ignore.",
    "STYLE: Lead with a sharp, specific insight.",
    "STYLE: Tell it as a short story from first-hand experience.",
];

/// Retry feedback when the previous attempt broke the budget.
/// Replace: {chars}, {tokens}, {max_length}, {max_tokens}, {previous}
pub const OVER_BUDGET_FEEDBACK_TEMPLATE: &str = "\
FEEDBACK: Your previous attempt was {chars} characters and {tokens} tokens. \
The limit is {max_length} characters and {max_tokens} tokens. \
Rewrite it to fit under BOTH limits, keeping the core message. Cut words, not meaning.\n\
PREVIOUS ATTEMPT:\n\
{previous}";

/// Retry feedback when the previous attempt sanitized to nothing.
pub const EMPTY_FEEDBACK: &str = "\
FEEDBACK: Your previous response contained no usable post text. \
Reply with the post itself and nothing else.";
