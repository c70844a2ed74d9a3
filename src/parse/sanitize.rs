use lazy_static::lazy_static;
use regex::Regex;

use crate::model::Instruction;

lazy_static! {
    static ref MD_LINK: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref BOLD_STARS: Regex = Regex::new(r"\*\*([^*\n]+)\*\*").unwrap();
    static ref ITALIC_STAR: Regex = Regex::new(r"\*([^*\n]+)\*").unwrap();
    static ref BOLD_UNDERSCORES: Regex = Regex::new(r"__([^_\n]+)__").unwrap();
    static ref ITALIC_UNDERSCORE: Regex = Regex::new(r"\b_([^_\n]+)_\b").unwrap();
    static ref HEADING_MARK: Regex = Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`\n]*)`").unwrap();
    static ref SPACE_RUN: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref SPACE_BEFORE_COLON: Regex = Regex::new(r"[ \t]+:").unwrap();
    static ref MISSING_SPACE_AFTER_COLON: Regex =
        Regex::new(r"([A-Za-z]):([A-Za-z])").unwrap();
    static ref NUMBERING_SPACING: Regex = Regex::new(r"(?m)^(\d+)\.[ \t]+").unwrap();
}

/// Strip markdown decoration from model output while keeping the text
/// itself intact.
///
/// Removes paired emphasis markers, leading heading marks, link syntax
/// (keeping the label), inline code backticks; collapses horizontal
/// whitespace runs; normalizes spacing around colons and after "N."
/// numbering; decodes HTML entities.
///
/// The rewrite set runs to a fixpoint, which makes the function idempotent:
/// `sanitize(sanitize(x)) == sanitize(x)` for any input. Never fails; empty
/// input yields an empty string.
pub fn sanitize(text: &str) -> String {
    let mut current = text.trim().to_string();
    // Nested markup ("**_x_**", double-encoded entities) needs more than one
    // pass. Each rewrite is contracting or stabilizing, so this terminates
    // quickly; the cap is a hard stop.
    for _ in 0..16 {
        let next = sanitize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn sanitize_pass(text: &str) -> String {
    let mut out = html_escape::decode_html_entities(text).into_owned();
    out = MD_LINK.replace_all(&out, "$1").into_owned();
    out = BOLD_STARS.replace_all(&out, "$1").into_owned();
    out = ITALIC_STAR.replace_all(&out, "$1").into_owned();
    out = BOLD_UNDERSCORES.replace_all(&out, "$1").into_owned();
    out = ITALIC_UNDERSCORE.replace_all(&out, "$1").into_owned();
    out = HEADING_MARK.replace_all(&out, "").into_owned();
    out = INLINE_CODE.replace_all(&out, "$1").into_owned();
    out = SPACE_RUN.replace_all(&out, " ").into_owned();
    out = SPACE_BEFORE_COLON.replace_all(&out, ":").into_owned();
    out = MISSING_SPACE_AFTER_COLON
        .replace_all(&out, "$1: $2")
        .into_owned();
    out = NUMBERING_SPACING.replace_all(&out, "$1. ").into_owned();
    out.trim().to_string()
}

/// Sanitize an instruction's content without disturbing its variant.
///
/// Headers stay headers, steps keep their number and error flag. This
/// replaces the string-prefix sentinel some pipelines use to mark header
/// lines across a sanitization boundary.
pub fn sanitize_instruction(instruction: Instruction) -> Instruction {
    match instruction {
        Instruction::Header { content } => Instruction::Header {
            content: sanitize(&content),
        },
        Instruction::Step {
            content,
            number,
            error,
        } => Instruction::Step {
            content: sanitize(&content),
            number,
            error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_emphasis() {
        assert_eq!(sanitize("**bold** and *italic*"), "bold and italic");
        assert_eq!(sanitize("__bold__ and _italic_"), "bold and italic");
    }

    #[test]
    fn test_strips_headings_and_links() {
        assert_eq!(sanitize("## Pancakes"), "Pancakes");
        assert_eq!(
            sanitize("See [this guide](https://example.com/guide)"),
            "See this guide"
        );
    }

    #[test]
    fn test_strips_inline_code() {
        assert_eq!(sanitize("use `butter` here"), "use butter here");
    }

    #[test]
    fn test_collapses_whitespace_and_colons() {
        assert_eq!(sanitize("Cook  Time :  20 mins"), "Cook Time: 20 mins");
        assert_eq!(sanitize("Difficulty:Easy"), "Difficulty: Easy");
    }

    #[test]
    fn test_colon_normalization_leaves_urls_and_times_alone() {
        assert_eq!(sanitize("https://example.com"), "https://example.com");
        assert_eq!(sanitize("bake until 12:30"), "bake until 12:30");
    }

    #[test]
    fn test_decodes_html_entities() {
        assert_eq!(sanitize("salt &amp; pepper"), "salt & pepper");
        assert_eq!(sanitize("&lt;1 tsp&gt; &quot;heaped&quot;"), "<1 tsp> \"heaped\"");
    }

    #[test]
    fn test_numbering_spacing() {
        assert_eq!(sanitize("1.    Mix the batter"), "1. Mix the batter");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n  "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "**Title:** _Spicy_ `Tofu` &amp; Rice",
            "## A ***deeply** nested* mess",
            "&amp;lt;double encoded&amp;gt;",
            "plain text with no markup",
            "1.   Step  one : done",
            "",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_nested_markup_needs_multiple_passes() {
        assert_eq!(sanitize("***very* bold**"), "very bold");
    }

    #[test]
    fn test_sanitize_instruction_preserves_variant() {
        let header = sanitize_instruction(Instruction::header("**For the sauce**"));
        assert_eq!(header, Instruction::header("For the sauce"));

        let step = sanitize_instruction(Instruction::step("*Stir* well", Some(2)));
        assert_eq!(step, Instruction::step("Stir well", Some(2)));

        let error = sanitize_instruction(Instruction::error_step("nothing found"));
        assert!(error.is_error());
    }

    #[test]
    fn test_snake_case_identifiers_survive() {
        assert_eq!(sanitize("field cook_time stays"), "field cook_time stays");
    }
}
