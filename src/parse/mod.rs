//! Response normalization.
//!
//! One raw model response goes in, a UI-safe [`Recipe`] or [`Article`]
//! comes out, whatever the model returned. The structured JSON path is
//! preferred when the model honored the requested output format; heuristic
//! field extraction covers format drift; a last-resort pass guarantees a
//! non-empty result for any input. None of this can fail: malformed input
//! degrades to placeholder content instead of an error.

pub mod fallback;
pub mod fields;
pub mod nutrition;
pub mod sanitize;
pub mod segment;

use chrono::Utc;
use log::debug;
use serde_json::Value;

use crate::model::{Article, Instruction, MacroNutrients, Recipe};
use sanitize::{sanitize, sanitize_instruction};

/// Substituted when no ingredients could be recovered; a list the UI can
/// render as an empty-state message, never `[]`.
pub const INGREDIENTS_PLACEHOLDER: &str =
    "Ingredients could not be detected. Please try again with a clearer image.";
/// Step content substituted when no instructions could be recovered.
pub const INSTRUCTIONS_PLACEHOLDER: &str =
    "Instructions could not be detected. Please try again with a clearer image.";
/// Article body substituted when generation returned nothing usable.
pub const CONTENT_PLACEHOLDER: &str =
    "This article could not be generated. Please try again.";

pub const DEFAULT_RECIPE_TITLE: &str = "Untitled Recipe";
pub const DEFAULT_ARTICLE_TITLE: &str = "Untitled Article";
pub const DEFAULT_COOK_TIME: &str = "30 mins";
pub const DEFAULT_PREP_TIME: &str = "15 mins";
pub const DEFAULT_TOTAL_TIME: &str = "45 mins";
pub const DEFAULT_SERVINGS: u32 = 4;
pub const DEFAULT_DIFFICULTY: &str = "Medium";
/// Shown when no dish image was generated for a record.
pub const FALLBACK_IMAGE_URL: &str = "https://placehold.co/800x500?text=Dish";

/// Normalize a raw model response into a [`Recipe`].
///
/// Total over all inputs: the result always has a non-empty title and
/// non-empty ingredient and instruction lists.
pub fn normalize_recipe(raw: &str) -> Recipe {
    let trimmed = raw.trim();
    if let Some(recipe) = structured_recipe(trimmed) {
        debug!("normalized recipe '{}' via structured path", recipe.title);
        return recipe;
    }
    heuristic_recipe(trimmed)
}

/// Normalize a raw model response into an [`Article`]. Total, like
/// [`normalize_recipe`].
pub fn normalize_article(raw: &str) -> Article {
    let trimmed = raw.trim();
    if let Some(article) = structured_article(trimmed) {
        debug!("normalized article '{}' via structured path", article.title);
        return article;
    }
    heuristic_article(trimmed)
}

// ---------------------------------------------------------------------------
// structured path

fn structured_recipe(text: &str) -> Option<Recipe> {
    let value = parse_json_object(text)?;

    let title = sanitize(value["title"].as_str().unwrap_or_default());
    let ingredients: Vec<String> = string_array(&value["ingredients"])
        .into_iter()
        .map(|entry| sanitize(&entry))
        .filter(|entry| !entry.is_empty())
        .collect();
    let instructions: Vec<Instruction> = string_array(&value["instructions"])
        .into_iter()
        .map(|entry| sanitize_instruction(step_from_text(&entry)))
        .filter(|instruction| !instruction.content().is_empty())
        .collect();

    // Required fields: title plus at least one of the two lists. Anything
    // less falls through to heuristic extraction.
    if title.is_empty() || (ingredients.is_empty() && instructions.is_empty()) {
        return None;
    }

    Some(Recipe {
        title,
        description: sanitize(str_field(&value, &["description"]).unwrap_or_default().as_str()),
        ingredients: non_empty_ingredients(ingredients),
        instructions: non_empty_instructions(instructions),
        cook_time: str_field(&value, &["cookTime", "cook_time"])
            .map(|s| sanitize(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_COOK_TIME.to_string()),
        prep_time: str_field(&value, &["prepTime", "prep_time"])
            .map(|s| sanitize(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PREP_TIME.to_string()),
        total_time: str_field(&value, &["totalTime", "total_time"])
            .map(|s| sanitize(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TOTAL_TIME.to_string()),
        servings: value["servings"]
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_SERVINGS),
        difficulty: str_field(&value, &["difficulty"])
            .map(|s| sanitize(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        tags: string_array(&value["tags"])
            .into_iter()
            .map(|tag| sanitize(&tag))
            .filter(|tag| !tag.is_empty())
            .collect(),
        image_url: str_field(&value, &["imageUrl", "image_url"])
            .unwrap_or_else(|| FALLBACK_IMAGE_URL.to_string()),
        macros: structured_macros(&value),
    })
}

/// An explicit macros object in structured output is trusted as-is; here
/// the model committed to "macros present", so missing core fields become
/// explicit zeros. Absence of the object stays `None`.
fn structured_macros(value: &Value) -> Option<MacroNutrients> {
    let macros = value.get("macros")?.as_object()?;
    let field = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| macros.get(*name))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };
    Some(MacroNutrients {
        calories: field(&["calories"]).unwrap_or(0),
        protein: field(&["protein"]).unwrap_or(0),
        carbs: field(&["carbs", "carbohydrates"]).unwrap_or(0),
        fat: field(&["fat"]).unwrap_or(0),
        fiber: field(&["fiber", "fibre"]),
        sugar: field(&["sugar"]),
        sodium: field(&["sodium"]),
        saturated_fat: field(&["saturatedFat", "saturated_fat"]),
    })
}

fn structured_article(text: &str) -> Option<Article> {
    let value = parse_json_object(text)?;

    let title = sanitize(value["title"].as_str().unwrap_or_default());
    // Content stays markdown; the reader renders it
    let content = value["content"].as_str().unwrap_or_default().trim().to_string();
    let summary = sanitize(value["summary"].as_str().unwrap_or_default());

    if title.is_empty() || content.is_empty() || summary.is_empty() {
        return None;
    }

    Some(Article {
        title,
        read_time: str_field(&value, &["readTime", "read_time"])
            .map(|s| sanitize(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| estimate_read_time(&content)),
        summary,
        image_url: str_field(&value, &["imageUrl", "image_url"])
            .unwrap_or_else(|| FALLBACK_IMAGE_URL.to_string()),
        tags: string_array(&value["tags"])
            .into_iter()
            .map(|tag| sanitize(&tag))
            .filter(|tag| !tag.is_empty())
            .collect(),
        published_at: Utc::now(),
        content,
    })
}

fn parse_json_object(text: &str) -> Option<Value> {
    if !(text.starts_with('{') && text.ends_with('}')) {
        return None;
    }
    let value: Value = serde_json::from_str(text).ok()?;
    value.is_object().then_some(value)
}

fn str_field(value: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| value.get(*name))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// A structured instruction entry may still carry its own "N." prefix;
/// keep the number rather than re-deriving it later.
fn step_from_text(text: &str) -> Instruction {
    lazy_static::lazy_static! {
        static ref NUMBERED: regex::Regex =
            regex::Regex::new(r"^[ \t]*(\d+)[.)][ \t]+(.*)$").unwrap();
    }
    match NUMBERED.captures(text) {
        Some(captures) => Instruction::step(captures[2].trim(), captures[1].parse().ok()),
        None => Instruction::step(text, None),
    }
}

// ---------------------------------------------------------------------------
// heuristic path

fn heuristic_recipe(text: &str) -> Recipe {
    let title = fields::extract_title(text)
        .map(|t| sanitize(&t))
        .filter(|t| !t.is_empty());

    let Some(title) = title else {
        return last_resort_recipe(text);
    };

    let ingredients: Vec<String> = fields::extract_ingredients(text)
        .iter()
        .map(|entry| sanitize(entry))
        .filter(|entry| !entry.is_empty())
        .collect();

    let instructions: Vec<Instruction> = fields::extract_instruction_block(text)
        .map(|block| segment::segment(&block))
        .unwrap_or_default()
        .into_iter()
        .map(sanitize_instruction)
        .filter(|instruction| !instruction.content().is_empty())
        .collect();

    Recipe {
        title,
        description: sanitize(&fields::extract_description(text)),
        ingredients: non_empty_ingredients(ingredients),
        instructions: non_empty_instructions(instructions),
        cook_time: fields::extract_cook_time(text)
            .unwrap_or_else(|| DEFAULT_COOK_TIME.to_string()),
        prep_time: fields::extract_prep_time(text)
            .unwrap_or_else(|| DEFAULT_PREP_TIME.to_string()),
        total_time: fields::extract_total_time(text)
            .unwrap_or_else(|| DEFAULT_TOTAL_TIME.to_string()),
        servings: fields::extract_servings(text).unwrap_or(DEFAULT_SERVINGS),
        difficulty: fields::extract_difficulty(text)
            .map(|d| sanitize(&d))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        tags: fields::extract_tags(text)
            .iter()
            .map(|tag| sanitize(tag))
            .filter(|tag| !tag.is_empty())
            .collect(),
        image_url: FALLBACK_IMAGE_URL.to_string(),
        macros: nutrition::extract_macros(text),
    }
}

fn last_resort_recipe(text: &str) -> Recipe {
    debug!("recipe extraction found no title; scavenging");
    let scavenged = fallback::scavenge(text);
    Recipe {
        title: DEFAULT_RECIPE_TITLE.to_string(),
        description: scavenged.description,
        ingredients: scavenged.ingredients,
        instructions: scavenged.instructions,
        cook_time: DEFAULT_COOK_TIME.to_string(),
        prep_time: DEFAULT_PREP_TIME.to_string(),
        total_time: DEFAULT_TOTAL_TIME.to_string(),
        servings: DEFAULT_SERVINGS,
        difficulty: DEFAULT_DIFFICULTY.to_string(),
        tags: Vec::new(),
        image_url: FALLBACK_IMAGE_URL.to_string(),
        macros: None,
    }
}

fn heuristic_article(text: &str) -> Article {
    let sanitized = sanitize(text);
    let title = fields::extract_title(text)
        .map(|t| sanitize(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_ARTICLE_TITLE.to_string());

    let summary = {
        let labeled = sanitize(&fields::extract_description(text));
        if labeled.is_empty() {
            sanitized.chars().take(200).collect::<String>().trim().to_string()
        } else {
            labeled
        }
    };

    let content = if text.trim().is_empty() {
        CONTENT_PLACEHOLDER.to_string()
    } else {
        text.trim().to_string()
    };

    Article {
        title,
        read_time: fields::extract_read_time(text)
            .unwrap_or_else(|| estimate_read_time(&content)),
        summary: if summary.is_empty() {
            CONTENT_PLACEHOLDER.to_string()
        } else {
            summary
        },
        image_url: FALLBACK_IMAGE_URL.to_string(),
        tags: fields::extract_tags(text)
            .iter()
            .map(|tag| sanitize(tag))
            .filter(|tag| !tag.is_empty())
            .collect(),
        published_at: Utc::now(),
        content,
    }
}

/// Reading speed of ~200 words per minute, floored at one minute.
fn estimate_read_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = (words / 200).max(1);
    format!("{minutes} min read")
}

fn non_empty_ingredients(ingredients: Vec<String>) -> Vec<String> {
    if ingredients.is_empty() {
        vec![INGREDIENTS_PLACEHOLDER.to_string()]
    } else {
        ingredients
    }
}

fn non_empty_instructions(instructions: Vec<Instruction>) -> Vec<Instruction> {
    if instructions.is_empty() {
        vec![Instruction::error_step(INSTRUCTIONS_PLACEHOLDER)]
    } else {
        instructions
    }
}
