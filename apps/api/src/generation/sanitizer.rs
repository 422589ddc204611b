//! Output Sanitizer — cleans every raw LLM response before it is measured.
//!
//! Order matters:
//! 1. strip wrapping quotes and code fences
//! 2. strip leading field labels (`Hook:`, `**CTA:**`, ...) and markdown headings
//! 3. cut at the first hallucination marker (`---`, `Replies`, `Notes:`, ...)
//! 4. drop leftover bold markers; strip pictographs when emojis are disallowed
//! 5. collapse whitespace to single spaces
//! 6. strip `#tags` when hashtags are disallowed, or append platform defaults when
//!    they are allowed and none are present
//! 7. final collapse + trim
//!
//! An empty result is valid output; the attempt loop decides what to do with it.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*```[\w+-]*[ \t]*$").expect("Invalid fence regex"));

static FIELD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:[-*][ \t]+)?(?:\*\*|__)?[ \t]*(?:hook|body|cta|call[ -]to[ -]action|opening|opener|main|closing|post|tweet|caption|reply|content|(?:variant|option|version)[ \t]*#?\d+)[ \t]*(?:\*\*|__)?[ \t]*:[ \t]*(?:\*\*|__)?",
    )
    .expect("Invalid field label regex")
});

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("Invalid heading regex"));

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|__").expect("Invalid emphasis regex"));

/// Horizontal rules end the post wherever they appear.
static RULE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{3,}|\*{3,}").expect("Invalid rule marker regex"));

/// Trailing commentary the model invents after the post itself. Only counts once
/// some post text precedes it.
static COMMENTARY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*[(\[]?(?:\*\*|__)?[ \t]*(?:replies|reply options|responses|notes?|explanation|rationale|character count|word count|token count|alternatives?|why this works)\b",
    )
    .expect("Invalid commentary marker regex")
});

static PICTOGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\x{1F1E6}-\x{1F1FF}\x{FE0F}\x{200D}\x{20E3}]")
        .expect("Invalid pictograph regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\p{N}_]*\p{L}[\p{L}\p{N}_]*").expect("Invalid hashtag regex"));

const WRAPPING_QUOTES: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('`', '`'),
    ('\u{201C}', '\u{201D}'),
    ('\u{2018}', '\u{2019}'),
];

/// Per-request sanitizer policy.
#[derive(Debug, Clone, Copy)]
pub struct SanitizeOptions<'a> {
    pub include_hashtags: bool,
    pub include_emojis: bool,
    /// Appended when hashtags are allowed and the text has none. Empty disables.
    pub default_hashtags: &'a [&'a str],
    /// Default hashtags are only appended while the text stays within this length.
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedOutput {
    pub text: String,
    /// Hashtags found in `text`, in order of first appearance. Always empty when
    /// hashtags are disallowed.
    pub hashtags: Vec<String>,
}

/// Runs the full sanitization pipeline on a raw model response.
pub fn sanitize(raw: &str, options: &SanitizeOptions<'_>) -> SanitizedOutput {
    let text = strip_fences(raw);
    let text = strip_field_labels(&text);
    let text = cut_at_hallucination_markers(&text);
    let text = finish(&text, options);

    let text = if options.include_hashtags && extract_hashtags(&text).is_empty() {
        append_default_hashtags(&text, options.default_hashtags, options.max_length)
    } else {
        text
    };

    let text = collapse_whitespace(&text);
    let hashtags = if options.include_hashtags {
        extract_hashtags(&text)
    } else {
        Vec::new()
    };

    SanitizedOutput { text, hashtags }
}

/// Cleans a fragment (e.g. a parsed hook) with the same emoji/hashtag policy,
/// without cutting markers or appending anything.
pub fn sanitize_fragment(fragment: &str, options: &SanitizeOptions<'_>) -> String {
    let text = strip_field_labels(fragment);
    finish(&text, options)
}

/// Steps 4-6 minus the default-hashtag append. Leftover bold markers go here too,
/// after marker cutting has had a chance to see `***` rules.
fn finish(text: &str, options: &SanitizeOptions<'_>) -> String {
    let text = EMPHASIS.replace_all(text, "");
    let text = if options.include_emojis {
        text.into_owned()
    } else {
        strip_emojis(&text)
    };
    let text = collapse_whitespace(&text);
    if options.include_hashtags {
        text
    } else {
        collapse_whitespace(&strip_hashtags(&text))
    }
}

/// Removes code-fence lines and any quote pair wrapping the whole response.
pub fn strip_fences(raw: &str) -> String {
    let mut text = FENCE_LINE.replace_all(raw, "").trim().to_string();

    loop {
        let mut chars = text.chars();
        let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
            break;
        };
        let Some(&(open, close)) = WRAPPING_QUOTES
            .iter()
            .find(|&&(open, close)| first == open && last == close)
        else {
            break;
        };
        let inner = &text[first.len_utf8()..text.len() - last.len_utf8()];
        // `"a," she said. "b"` opens and closes with quotes of different quotations.
        if contains_quote(inner, open, close) {
            break;
        }
        text = inner.trim().to_string();
    }

    text
}

/// True when `text` holds `open` or `close` anywhere other than as an in-word
/// apostrophe (`it's`).
fn contains_quote(text: &str, open: char, close: char) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.iter().enumerate().any(|(i, &c)| {
        if c != open && c != close {
            return false;
        }
        let in_word = i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        !in_word
    })
}

/// Drops leading `Hook:` / `**Body:**` style labels and markdown headings.
pub fn strip_field_labels(text: &str) -> String {
    let text = FIELD_LABEL.replace_all(text, "");
    MARKDOWN_HEADING.replace_all(&text, "").into_owned()
}

/// Truncates at the first hallucination marker, if any.
pub fn cut_at_hallucination_markers(text: &str) -> String {
    let rule = RULE_MARKER.find(text).map(|m| m.start());
    let commentary = COMMENTARY_MARKER
        .find_iter(text)
        .map(|m| m.start())
        .find(|&start| !text[..start].trim().is_empty());

    match rule.into_iter().chain(commentary).min() {
        Some(cut) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

pub fn strip_emojis(text: &str) -> String {
    PICTOGRAPH.replace_all(text, "").into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

pub fn strip_hashtags(text: &str) -> String {
    HASHTAG.replace_all(text, "").into_owned()
}

/// Distinct hashtags in order of first appearance, verbatim as they occur in `text`.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for m in HASHTAG.find_iter(text) {
        if !tags.iter().any(|t| t == m.as_str()) {
            tags.push(m.as_str().to_string());
        }
    }
    tags
}

fn append_default_hashtags(text: &str, defaults: &[&str], max_length: Option<usize>) -> String {
    let mut out = text.to_string();
    if out.is_empty() {
        return out;
    }
    for tag in defaults {
        let candidate = format!("{out} {tag}");
        if max_length.map_or(true, |max| candidate.chars().count() <= max) {
            out = candidate;
        }
    }
    out
}
