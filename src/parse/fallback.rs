//! Last-resort extraction.
//!
//! Runs when heuristic extraction could not even find a title. Whatever the
//! model returned, the UI still needs something renderable, so this pass
//! scavenges the sanitized text for ingredient-shaped lines and
//! paragraph-shaped chunks and substitutes placeholders where it finds
//! nothing.

use lazy_static::lazy_static;
use regex::Regex;

use super::sanitize::sanitize;
use super::{INGREDIENTS_PLACEHOLDER, INSTRUCTIONS_PLACEHOLDER};
use crate::model::Instruction;

lazy_static! {
    static ref MEASUREMENT_UNIT: Regex = Regex::new(
        r"(?i)\b(?:cups?|tbsps?|tablespoons?|tsps?|teaspoons?|oz|ounces?|grams?|g|kg|ml|l|liters?|litres?|lbs?|pounds?|cloves?|slices?|pinch|dash|cans?|sticks?|bunch(?:es)?)\b"
    )
    .unwrap();
    static ref FOOD_WORD: Regex = Regex::new(
        r"(?i)\b(?:salt|pepper|oil|butter|sugar|flour|eggs?|onions?|garlic|cheese|milk|cream|tomato(?:es)?|chicken|beef|pork|fish|tofu|rice|pasta|noodles?|water|stock|broth|lemon|lime|herbs?|spices?|sauce|vinegar|honey)\b"
    )
    .unwrap();
    static ref COOKING_VERB: Regex = Regex::new(
        r"(?i)\b(?:mix|stir|bake|cook|heat|add|combine|whisk|pour|preheat|simmer|boil|fry|saute|roast|grill|chop|slice|dice|serve|place|remove|transfer|season|drain|fold|knead|rest)\b"
    )
    .unwrap();
    static ref LEADING_MARKER: Regex = Regex::new(r"^[ \t]*(?:[-*•+]|\d+[.)])[ \t]+").unwrap();
}

/// Everything the last-resort pass could recover.
#[derive(Debug)]
pub struct Scavenged {
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<Instruction>,
}

/// Scavenge a response that defeated heuristic extraction.
///
/// The description is the first ~200 characters of sanitized text. An
/// ingredient-shaped line is short, mentions a measurement unit or a common
/// food word, and contains no cooking verb. A paragraph-shaped chunk of
/// 20-500 characters becomes a step. Both lists fall back to a one-entry
/// placeholder rather than coming back empty.
pub fn scavenge(text: &str) -> Scavenged {
    let sanitized = sanitize(text);

    let description: String = sanitized.chars().take(200).collect::<String>().trim().to_string();

    let mut ingredients: Vec<String> = sanitized
        .lines()
        .map(|line| LEADING_MARKER.replace(line, "").trim().to_string())
        .filter(|line| looks_like_ingredient(line))
        .collect();

    let mut instructions: Vec<Instruction> = sanitized
        .split("\n\n")
        .map(|chunk| chunk.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|chunk| {
            let len = chunk.chars().count();
            (20..=500).contains(&len)
        })
        .map(|chunk| Instruction::step(chunk, None))
        .collect();

    if ingredients.is_empty() {
        ingredients.push(INGREDIENTS_PLACEHOLDER.to_string());
    }
    if instructions.is_empty() {
        instructions.push(Instruction::error_step(INSTRUCTIONS_PLACEHOLDER));
    }

    Scavenged {
        description,
        ingredients,
        instructions,
    }
}

fn looks_like_ingredient(line: &str) -> bool {
    let len = line.chars().count();
    if !(3..60).contains(&len) {
        return false;
    }
    if COOKING_VERB.is_match(line) {
        return false;
    }
    MEASUREMENT_UNIT.is_match(line) || FOOD_WORD.is_match(line)
}
