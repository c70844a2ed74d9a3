//! Macro-nutrient extraction.
//!
//! A macros object is only built when the text actually stated at least one
//! of the four core values (calories, protein, carbs, fat); an all-zero
//! object is never synthesized from silence. Only the structured-JSON path
//! in the normalizer may produce explicit zeros, because there the model
//! itself committed to a macros object.

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::MacroNutrients;

lazy_static! {
    static ref NUTRITION_HEADER: Regex = Regex::new(
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?\**[ \t]*(?:nutrition(?:al)?(?:[ \t]+(?:information|facts))?|macros?|macro-?nutrients)\b[^\n]*$"
    )
    .unwrap();
    static ref CALORIES_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\bcalories[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap(),
        Regex::new(r"(?i)\bkcal[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap(),
    ];
    static ref PROTEIN_RULES: Vec<Regex> =
        vec![Regex::new(r"(?i)\bprotein[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap()];
    static ref CARBS_RULES: Vec<Regex> =
        vec![Regex::new(r"(?i)\bcarb(?:ohydrate)?s?[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap()];
    // "fat" must not match inside "Saturated Fat", and the regex crate has
    // no lookbehind, so the plain-label rule anchors on a line start or a
    // separator instead.
    static ref FAT_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\btotal[ \t]+fat[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap(),
        Regex::new(r"(?im)^[ \t]*[-*•]?[ \t]*\**fat\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap(),
        Regex::new(r"(?i)[,;|][ \t]*\**fat\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap(),
    ];
    static ref FIBER_RULES: Vec<Regex> =
        vec![Regex::new(r"(?i)\bfib(?:er|re)[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap()];
    static ref SUGAR_RULES: Vec<Regex> =
        vec![Regex::new(r"(?i)\bsugars?[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap()];
    static ref SODIUM_RULES: Vec<Regex> =
        vec![Regex::new(r"(?i)\bsodium[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap()];
    static ref SATURATED_FAT_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)\bsaturated[ \t-]*fat[ \t]*\**[ \t]*:[ \t]*\**[ \t]*(\d+)").unwrap(),
    ];
}

fn first_number(rules: &[Regex], text: &str) -> Option<u32> {
    rules
        .iter()
        .find_map(|rule| rule.captures(text))
        .and_then(|captures| captures[1].parse().ok())
}

/// Extract macro-nutrients from the response text.
///
/// When a nutrition-family header exists, matching is scoped to the text
/// after it; otherwise the whole text is searched. Returns `None` unless at
/// least one of calories/protein/carbs/fat matched. Optional nutrients are
/// carried only when individually present.
pub fn extract_macros(text: &str) -> Option<MacroNutrients> {
    let scope = match NUTRITION_HEADER.find(text) {
        Some(header) => &text[header.end()..],
        None => text,
    };

    let calories = first_number(&CALORIES_RULES, scope);
    let protein = first_number(&PROTEIN_RULES, scope);
    let carbs = first_number(&CARBS_RULES, scope);
    let fat = first_number(&FAT_RULES, scope);

    if calories.is_none() && protein.is_none() && carbs.is_none() && fat.is_none() {
        return None;
    }

    Some(MacroNutrients {
        calories: calories.unwrap_or(0),
        protein: protein.unwrap_or(0),
        carbs: carbs.unwrap_or(0),
        fat: fat.unwrap_or(0),
        fiber: first_number(&FIBER_RULES, scope),
        sugar: first_number(&SUGAR_RULES, scope),
        sodium: first_number(&SODIUM_RULES, scope),
        saturated_fat: first_number(&SATURATED_FAT_RULES, scope),
    })
}
