use serde::{Deserialize, Serialize};

/// Maximum number of input characters forwarded to the model. Longer
/// selections are cut off before prompt construction; the cut is silent at
/// the prompt level and reported to the caller via the `wasCapped` flag.
pub const MAX_INPUT_CHARS: usize = 3000;

/// Sampling temperature for summarization. Kept low so the notes stay close
/// to the source text.
pub const SUMMARY_TEMPERATURE: f32 = 0.3;

/// System instruction sent alongside every summarization prompt.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a study assistant. Be accurate. Do not invent details.";

/// Output style selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Full-sentence notes carrying context and cause/effect.
    #[default]
    Essay,
    /// Strict fact-fragment notes for last-minute revision.
    Exam,
}

impl SummaryMode {
    /// Lossy parse for the request's `mode` field: "exam" (any casing)
    /// selects exam mode, anything else, including nothing, is essay.
    pub fn parse_lossy(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("exam") => SummaryMode::Exam,
            _ => SummaryMode::Essay,
        }
    }
}

/// Truncates `text` to `MAX_INPUT_CHARS` characters, returning the processed
/// slice and whether anything was cut off.
pub fn cap_text(text: &str) -> (&str, bool) {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

const EXAM_RULES: &str = "EXAM MODE (STRICT RULES):
- NO full sentences.
- NO explanations.
- NO adjectives or opinions.
- Each bullet must be a short factual fragment.
- Use formats like:
  • YEAR – EVENT
  • NAME → OUTCOME
  • WORK → PERSON
- Think: what would I memorise the night before an exam?

Write 8–14 bullets.";

const ESSAY_RULES: &str = "ESSAY MODE (STRICT RULES):
- Full sentences only.
- Each bullet should contain context or cause/effect.
- Written so it could be expanded into a paragraph.
- Academic but clear tone.

Write 6–10 bullets.";

const EXAM_FOCUS_RULES: &str = "EXAM FOCUS RULES:
- Same fragment-style bullets.
- 3–5 bullets.
- Facts only, no explanation.";

const ESSAY_FOCUS_RULES: &str = "ESSAY FOCUS RULES:
- Full sentences.
- Explain how the keyword fits into the text.
- 3–5 bullets.";

const SKIP_FOCUS: &str = "Skip this section if no keyword.";

/// Builds the model-ready instruction string. Pure: the same (text, mode,
/// keyword) triple always yields the same prompt. `keyword` is expected to
/// be trimmed and non-empty, or `None`.
pub fn build_prompt(processed_text: &str, mode: SummaryMode, keyword: Option<&str>) -> String {
    let mode_label = match mode {
        SummaryMode::Exam => "EXAM MODE",
        SummaryMode::Essay => "ESSAY MODE",
    };
    let main_rules = match mode {
        SummaryMode::Exam => EXAM_RULES,
        SummaryMode::Essay => ESSAY_RULES,
    };
    let focus_label = keyword.unwrap_or("N/A");
    let focus_rules = match (keyword, mode) {
        (Some(_), SummaryMode::Exam) => EXAM_FOCUS_RULES,
        (Some(_), SummaryMode::Essay) => ESSAY_FOCUS_RULES,
        (None, _) => SKIP_FOCUS,
    };

    format!(
        "You must ONLY use information from the provided TEXT.

====================
SECTION 1 — MAIN NOTES ({mode_label})
====================

{main_rules}

====================
SECTION 2 — FOCUS: \"{focus_label}\"
====================

{focus_rules}

RULES:
- Do not invent information.
- Stay under 220 words total.

TEXT:
{processed_text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lossy() {
        assert_eq!(SummaryMode::parse_lossy(Some("exam")), SummaryMode::Exam);
        assert_eq!(SummaryMode::parse_lossy(Some("EXAM")), SummaryMode::Exam);
        assert_eq!(SummaryMode::parse_lossy(Some("essay")), SummaryMode::Essay);
        assert_eq!(
            SummaryMode::parse_lossy(Some("flashcards")),
            SummaryMode::Essay
        );
        assert_eq!(SummaryMode::parse_lossy(Some("")), SummaryMode::Essay);
        assert_eq!(SummaryMode::parse_lossy(None), SummaryMode::Essay);
    }

    #[test]
    fn test_cap_text_over_limit() {
        let text = "A".repeat(3500);
        let (processed, was_capped) = cap_text(&text);
        assert!(was_capped);
        assert_eq!(processed.chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_cap_text_at_limit() {
        let text = "A".repeat(3000);
        let (processed, was_capped) = cap_text(&text);
        assert!(!was_capped);
        assert_eq!(processed.len(), 3000);
    }

    #[test]
    fn test_cap_text_multibyte_is_counted_in_chars() {
        let text = "é".repeat(3500);
        let (processed, was_capped) = cap_text(&text);
        assert!(was_capped);
        assert_eq!(processed.chars().count(), MAX_INPUT_CHARS);
        // Two bytes per character; the slice must still be on a boundary.
        assert_eq!(processed.len(), MAX_INPUT_CHARS * 2);
    }

    #[test]
    fn test_exam_prompt_requests_fragments() {
        let prompt = build_prompt("Some text.", SummaryMode::Exam, None);
        assert!(prompt.contains("SECTION 1 — MAIN NOTES (EXAM MODE)"));
        assert!(prompt.contains("Write 8–14 bullets."));
        assert!(prompt.contains("NO full sentences."));
        assert!(prompt.contains("YEAR – EVENT"));
        assert!(!prompt.contains("Full sentences only."));
        assert!(!prompt.contains("Write 6–10 bullets."));
    }

    #[test]
    fn test_essay_prompt_requests_full_sentences() {
        let prompt = build_prompt("Some text.", SummaryMode::Essay, None);
        assert!(prompt.contains("SECTION 1 — MAIN NOTES (ESSAY MODE)"));
        assert!(prompt.contains("Write 6–10 bullets."));
        assert!(prompt.contains("Full sentences only."));
        assert!(!prompt.contains("Write 8–14 bullets."));
    }

    #[test]
    fn test_keyword_adds_focus_section() {
        let prompt = build_prompt("Some text.", SummaryMode::Exam, Some("war"));
        assert!(prompt.contains("SECTION 2 — FOCUS: \"war\""));
        assert!(prompt.contains("EXAM FOCUS RULES:"));
        assert!(prompt.contains("3–5 bullets."));
        assert!(!prompt.contains(SKIP_FOCUS));

        let prompt = build_prompt("Some text.", SummaryMode::Essay, Some("war"));
        assert!(prompt.contains("ESSAY FOCUS RULES:"));
        assert!(prompt.contains("Explain how the keyword fits into the text."));
    }

    #[test]
    fn test_no_keyword_instructs_skip() {
        let prompt = build_prompt("Some text.", SummaryMode::Essay, None);
        assert!(prompt.contains("SECTION 2 — FOCUS: \"N/A\""));
        assert!(prompt.contains(SKIP_FOCUS));
        assert!(!prompt.contains("3–5 bullets."));
    }

    #[test]
    fn test_prompt_always_carries_grounding_rules() {
        for mode in [SummaryMode::Essay, SummaryMode::Exam] {
            for keyword in [None, Some("ottoman empire")] {
                let prompt = build_prompt("Some text.", mode, keyword);
                assert!(prompt.starts_with("You must ONLY use information"));
                assert!(prompt.contains("- Do not invent information."));
                assert!(prompt.contains("- Stay under 220 words total."));
            }
        }
    }

    #[test]
    fn test_prompt_ends_with_the_text() {
        let prompt = build_prompt("The Treaty of Versailles.", SummaryMode::Essay, None);
        assert!(prompt.ends_with("TEXT:\nThe Treaty of Versailles."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("Same text.", SummaryMode::Exam, Some("war"));
        let b = build_prompt("Same text.", SummaryMode::Exam, Some("war"));
        assert_eq!(a, b);
    }
}
