//! Field extraction rules over one raw model response.
//!
//! Every extractor is a pure function evaluating an ordered list of
//! patterns and returning the first non-empty match. The ordering is a
//! deliberate tie-break policy: label-prefixed matches ("Title: ...")
//! outrank positional heuristics (first line). Patterns are tolerant of a
//! leading markdown bold or heading marker before the label, and all label
//! matching is case-insensitive.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TITLE_RULES: Vec<Regex> = vec![
        // Explicit label, optionally heading- or bold-wrapped
        Regex::new(r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*title[ \t]*\**[ \t]*:[ \t]*(.+)$")
            .unwrap(),
        // Markdown heading at the start of a line
        Regex::new(r"(?m)^#{1,6}[ \t]+(.+)$").unwrap(),
        // Bold text at the start of a line
        Regex::new(r"(?m)^\*\*([^*\n]+)\*\*").unwrap(),
    ];
    static ref DESCRIPTION_RULES: Vec<Regex> = vec![
        // Label up to the next blank line or the Ingredients marker
        Regex::new(
            r"(?ims)^[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*(?:description|about)[ \t]*\**[ \t]*:[ \t]*(.+?)(?:\n[ \t]*\n|\n[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*ingredients\b|\z)"
        )
        .unwrap(),
    ];
    static ref INGREDIENTS_HEADER: Regex =
        Regex::new(r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*ingredients\b[^\n]*$").unwrap();
    static ref METHOD_HEADER: Regex = Regex::new(
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*(?:instructions|directions|preparation|method|steps)\b[^\n]*$"
    )
    .unwrap();
    static ref NOTES_HEADER: Regex =
        Regex::new(r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*(?:notes|tips)\b[^\n]*$").unwrap();
    static ref LIST_MARKER: Regex = Regex::new(r"^[ \t]*(?:[-*•+]|\d+[.)])[ \t]+").unwrap();
    static ref BARE_BULLET: Regex = Regex::new(r"(?m)^[ \t]*[-*•][ \t]+(.+)$").unwrap();
    static ref COOK_TIME_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*cook(?:ing)?[ \t]*time[ \t]*\**[ \t]*:[ \t]*([^\n]+)").unwrap(),
        Regex::new(r"(?i)takes[ \t]+about[ \t]+([^.\n]+?)[ \t]+to[ \t]+cook").unwrap(),
    ];
    static ref PREP_TIME_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*prep(?:aration)?[ \t]*time[ \t]*\**[ \t]*:[ \t]*([^\n]+)")
            .unwrap(),
        Regex::new(r"(?i)takes[ \t]+about[ \t]+([^.\n]+?)[ \t]+to[ \t]+prep(?:are)?").unwrap(),
    ];
    static ref TOTAL_TIME_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*total[ \t]*time[ \t]*\**[ \t]*:[ \t]*([^\n]+)").unwrap(),
    ];
    static ref SERVINGS_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*(?:servings|serves|yield)[ \t]*\**[ \t]*:?[ \t]*\**[ \t]*(\d+)")
            .unwrap(),
        Regex::new(r"(?i)\bmakes[ \t]+(\d+)").unwrap(),
    ];
    static ref DIFFICULTY_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*difficulty[ \t]*\**[ \t]*:[ \t]*([^\n.]+)").unwrap(),
    ];
    static ref TAGS_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*(?:tags|categories)[ \t]*\**[ \t]*:[ \t]*([^\n]+)").unwrap(),
    ];
    static ref READ_TIME_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\**[ \t]*read(?:ing)?[ \t]*time[ \t]*\**[ \t]*:[ \t]*([^\n]+)").unwrap(),
    ];
}

/// Evaluate an ordered rule list and return the first rule's first capture
/// group, trimmed of surrounding whitespace and stray emphasis residue.
fn first_capture(rules: &[Regex], text: &str) -> Option<String> {
    for rule in rules {
        if let Some(captures) = rule.captures(text) {
            let matched = captures[1].trim().trim_matches('*').trim();
            if !matched.is_empty() {
                return Some(matched.to_string());
            }
        }
    }
    None
}

/// Recipe or article title. Label beats heading beats bold beats the first
/// non-empty line; `None` only when the text holds nothing at all.
pub fn extract_title(text: &str) -> Option<String> {
    if let Some(title) = first_capture(&TITLE_RULES, text) {
        return Some(title);
    }
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
}

/// Description text. Label-prefixed match first; otherwise the 1-2 lines
/// sitting between the title line and the Ingredients marker. Empty when
/// neither applies - never fabricated.
pub fn extract_description(text: &str) -> String {
    if let Some(description) = first_capture(&DESCRIPTION_RULES, text) {
        return description;
    }
    let Some(marker) = INGREDIENTS_HEADER.find(text) else {
        return String::new();
    };
    text[..marker.start()]
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1) // the title line
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ingredient lines from the block between the Ingredients header and the
/// next known section header (or end of text). Falls back to bare bullet
/// lines anywhere in the text when no header exists.
pub fn extract_ingredients(text: &str) -> Vec<String> {
    if let Some(header) = INGREDIENTS_HEADER.find(text) {
        let after = &text[header.end()..];
        let end = METHOD_HEADER
            .find(after)
            .map(|m| m.start())
            .unwrap_or(after.len());
        return after[..end]
            .lines()
            .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
    }
    BARE_BULLET
        .captures_iter(text)
        .map(|captures| captures[1].trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// The raw block of instruction text, to be handed to the segmenter.
/// Spans from the first Instructions-family header to a Notes/Tips header
/// or end of text.
pub fn extract_instruction_block(text: &str) -> Option<String> {
    let header = METHOD_HEADER.find(text)?;
    let after = &text[header.end()..];
    let end = NOTES_HEADER
        .find(after)
        .map(|m| m.start())
        .unwrap_or(after.len());
    let block = after[..end].trim();
    if block.is_empty() {
        None
    } else {
        Some(block.to_string())
    }
}

/// Timing labels are matched across the whole response text, not scoped to
/// a dedicated metadata section; a "Cooking Time:" trailing the last step
/// still yields a cook time.
pub fn extract_cook_time(text: &str) -> Option<String> {
    first_capture(&COOK_TIME_RULES, text)
}

pub fn extract_prep_time(text: &str) -> Option<String> {
    first_capture(&PREP_TIME_RULES, text)
}

pub fn extract_total_time(text: &str) -> Option<String> {
    first_capture(&TOTAL_TIME_RULES, text)
}

/// First positive integer after a servings-family label.
pub fn extract_servings(text: &str) -> Option<u32> {
    first_capture(&SERVINGS_RULES, text)?
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
}

pub fn extract_difficulty(text: &str) -> Option<String> {
    first_capture(&DIFFICULTY_RULES, text)
}

/// Comma- or semicolon-separated tag list; empty entries dropped.
pub fn extract_tags(text: &str) -> Vec<String> {
    let Some(raw) = first_capture(&TAGS_RULES, text) else {
        return Vec::new();
    };
    raw.split([',', ';'])
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

pub fn extract_read_time(text: &str) -> Option<String> {
    first_capture(&READ_TIME_RULES, text)
}
