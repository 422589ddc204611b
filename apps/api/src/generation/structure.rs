//! Hook / body / CTA decomposition of a model response.
//!
//! Parsing is driven by a small table of label shapes. A response either matches a
//! shape (`StructuredResponse::Parsed`) or it does not (`Unstructured`); there is no
//! silent heuristic fallback inside the parser. Heuristic splitting of plain text
//! lives in `decompose_plain`, which callers choose explicitly.

use std::sync::LazyLock;

use regex::Regex;

use crate::generation::models::HookType;

/// Which label vocabulary a structured response used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `Hook:` / `Body:` / `CTA:` (or `Call to action:`)
    HookBodyCta,
    /// `Opening:` / `Main:` / `Closing:`
    OpeningMainClosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredResponse {
    Parsed {
        shape: ResponseShape,
        hook: String,
        body: String,
        cta: String,
    },
    Unstructured {
        raw: String,
    },
}

/// The three post slots in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostParts {
    pub hook: String,
    pub body: String,
    pub cta: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Hook,
    Body,
    Cta,
}

struct ShapeRule {
    shape: ResponseShape,
    pattern: Regex,
    slot_for: fn(&str) -> Option<Slot>,
}

fn label_pattern(labels: &str) -> Regex {
    let pattern = format!(
        r"(?mi)^[ \t]*(?:[-*][ \t]+)?(?:\*\*|__)?[ \t]*({labels})[ \t]*(?:\*\*|__)?[ \t]*:[ \t]*(?:\*\*|__)?"
    );
    Regex::new(&pattern).expect("Invalid structure label regex")
}

static SHAPES: LazyLock<Vec<ShapeRule>> = LazyLock::new(|| {
    vec![
        ShapeRule {
            shape: ResponseShape::HookBodyCta,
            pattern: label_pattern(r"hook|body|cta|call[ -]to[ -]action"),
            slot_for: |label| match label.to_ascii_lowercase().as_str() {
                "hook" => Some(Slot::Hook),
                "body" => Some(Slot::Body),
                _ => Some(Slot::Cta),
            },
        },
        ShapeRule {
            shape: ResponseShape::OpeningMainClosing,
            pattern: label_pattern(r"opening|opener|main|closing"),
            slot_for: |label| match label.to_ascii_lowercase().as_str() {
                "opening" | "opener" => Some(Slot::Hook),
                "main" => Some(Slot::Body),
                "closing" => Some(Slot::Cta),
                _ => None,
            },
        },
    ]
});

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("Invalid sentence regex"));

/// Imperative openers that mark a closing sentence as a call to action.
const CTA_VERBS: &[&str] = &[
    "comment", "share", "follow", "tell", "try", "join", "drop", "let", "check", "read",
    "dm", "save", "tag", "click", "sign", "subscribe", "reply", "repost", "grab", "book",
];

const STORY_OPENERS: &[&str] = &[
    "i ", "i'", "my ", "when i", "last ", "yesterday", "years ago", "once ", "today i",
];

/// Parses a fence-stripped response against the label-shape table.
///
/// A shape matches when both a hook and a body label are present; the CTA is optional.
pub fn parse_structure(text: &str) -> StructuredResponse {
    for rule in SHAPES.iter() {
        let labels: Vec<_> = rule.pattern.captures_iter(text).collect();
        if labels.is_empty() {
            continue;
        }

        let mut parts = PostParts::default();
        for (i, caps) in labels.iter().enumerate() {
            let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let end = labels
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let section = text[whole.end()..end].trim();
            match (rule.slot_for)(label.as_str()) {
                Some(Slot::Hook) => parts.hook = section.to_string(),
                Some(Slot::Body) => parts.body = section.to_string(),
                Some(Slot::Cta) => parts.cta = section.to_string(),
                None => {}
            }
        }

        if !parts.hook.is_empty() && !parts.body.is_empty() {
            return StructuredResponse::Parsed {
                shape: rule.shape,
                hook: parts.hook,
                body: parts.body,
                cta: parts.cta,
            };
        }
    }

    StructuredResponse::Unstructured {
        raw: text.to_string(),
    }
}

/// Best-effort split of plain text: first sentence is the hook, a trailing question or
/// imperative sentence is the CTA, the rest is the body. When nothing is left for the
/// body it repeats the whole content.
pub fn decompose_plain(content: &str) -> PostParts {
    let sentences = split_sentences(content);
    let Some(first) = sentences.first() else {
        return PostParts::default();
    };

    let hook = first.to_string();
    let cta = match sentences.last() {
        Some(last) if sentences.len() >= 2 && looks_like_cta(last) => last.to_string(),
        _ => String::new(),
    };

    let body_end = if cta.is_empty() {
        sentences.len()
    } else {
        sentences.len() - 1
    };
    let middle = sentences[1..body_end].join(" ");
    let body = if middle.is_empty() {
        content.to_string()
    } else {
        middle
    };

    PostParts { hook, body, cta }
}

pub fn classify_hook(hook: &str) -> HookType {
    let lower = hook.trim().to_lowercase();
    if lower.contains('?') {
        HookType::Question
    } else if lower.chars().any(|c| c.is_ascii_digit()) {
        HookType::Statistic
    } else if STORY_OPENERS.iter().any(|s| lower.starts_with(s)) {
        HookType::Story
    } else {
        HookType::Statement
    }
}

fn split_sentences(content: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(content) {
        let sentence = content[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let tail = content[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn looks_like_cta(sentence: &str) -> bool {
    if sentence.trim_end().ends_with('?') {
        return true;
    }
    let first_word = sentence
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    CTA_VERBS.contains(&first_word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_hook_body_cta_labels() {
        let raw = "Hook: Stop guessing.\nBody: Measure first, then optimise.\nCTA: What do you measure?";
        match parse_structure(raw) {
            StructuredResponse::Parsed {
                shape,
                hook,
                body,
                cta,
            } => {
                assert_eq!(shape, ResponseShape::HookBodyCta);
                assert_eq!(hook, "Stop guessing.");
                assert_eq!(body, "Measure first, then optimise.");
                assert_eq!(cta, "What do you measure?");
            }
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_bold_labels_and_multiline_body() {
        let raw = "**Hook:** Big claim.\n**Body:** Line one.\nLine two.\n**Call to action:** Follow along.";
        let StructuredResponse::Parsed { body, cta, .. } = parse_structure(raw) else {
            panic!("expected Parsed");
        };
        assert_eq!(body, "Line one.\nLine two.");
        assert_eq!(cta, "Follow along.");
    }

    #[test]
    fn test_parses_opening_main_closing_shape() {
        let raw = "Opening: A story.\nMain: The lesson.\nClosing: Try it.";
        let StructuredResponse::Parsed { shape, hook, .. } = parse_structure(raw) else {
            panic!("expected Parsed");
        };
        assert_eq!(shape, ResponseShape::OpeningMainClosing);
        assert_eq!(hook, "A story.");
    }

    #[test]
    fn test_plain_text_is_unstructured() {
        let raw = "Just a normal post with no labels.";
        assert_eq!(
            parse_structure(raw),
            StructuredResponse::Unstructured {
                raw: raw.to_string()
            }
        );
    }

    #[test]
    fn test_hook_without_body_is_unstructured() {
        let raw = "Hook: only a hook here";
        assert!(matches!(
            parse_structure(raw),
            StructuredResponse::Unstructured { .. }
        ));
    }

    #[test]
    fn test_decompose_plain_with_question_cta() {
        let parts = decompose_plain("Most roadmaps lie. Dates are guesses. Scope is a bet. What is yours hiding?");
        assert_eq!(parts.hook, "Most roadmaps lie.");
        assert_eq!(parts.body, "Dates are guesses. Scope is a bet.");
        assert_eq!(parts.cta, "What is yours hiding?");
    }

    #[test]
    fn test_decompose_single_sentence_duplicates_content() {
        let parts = decompose_plain("One line only");
        assert_eq!(parts.hook, "One line only");
        assert_eq!(parts.body, "One line only");
        assert_eq!(parts.cta, "");
    }

    #[test]
    fn test_decompose_imperative_cta() {
        let parts = decompose_plain("Shipping beats polishing. Follow for more lessons.");
        assert_eq!(parts.cta, "Follow for more lessons.");
        assert_eq!(parts.body, "Shipping beats polishing. Follow for more lessons.");
    }

    #[test]
    fn test_decompose_empty() {
        assert_eq!(decompose_plain(""), PostParts::default());
    }

    #[test]
    fn test_classify_hook() {
        assert_eq!(classify_hook("Ever shipped on a Friday?"), HookType::Question);
        assert_eq!(classify_hook("90% of startups fail."), HookType::Statistic);
        assert_eq!(classify_hook("I got fired on a Tuesday."), HookType::Story);
        assert_eq!(classify_hook("Meetings are a tax."), HookType::Statement);
    }
}
