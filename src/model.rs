use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured recipe recovered from one model response.
///
/// After normalization the title is non-empty and both `ingredients` and
/// `instructions` contain at least one entry; when nothing could be
/// extracted, a placeholder entry is substituted so the UI never renders a
/// blank list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<Instruction>,
    /// Free-text duration (e.g. "20 mins"), not machine-parsed
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub total_time: String,
    pub servings: u32,
    pub difficulty: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroNutrients>,
}

/// One entry of a recipe's instruction list.
///
/// Section headers are a distinct variant rather than a magic string prefix,
/// so model text that happens to start with the same characters can never be
/// mistaken for a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    /// A section header line ("For the sauce"), rendered distinctly
    Header { content: String },
    /// A cookable step
    Step {
        content: String,
        /// Step number parsed verbatim from the source text, if any.
        /// Out-of-order or skipped numbers are passed through untouched.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        number: Option<u32>,
        /// Set when the content is a "not detected" placeholder rather than
        /// a real step, so the UI can render an empty-state affordance
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        error: bool,
    },
}

impl Instruction {
    pub fn header(content: impl Into<String>) -> Self {
        Instruction::Header {
            content: content.into(),
        }
    }

    pub fn step(content: impl Into<String>, number: Option<u32>) -> Self {
        Instruction::Step {
            content: content.into(),
            number,
            error: false,
        }
    }

    pub fn error_step(content: impl Into<String>) -> Self {
        Instruction::Step {
            content: content.into(),
            number: None,
            error: true,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Instruction::Header { content } => content,
            Instruction::Step { content, .. } => content,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Instruction::Header { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Instruction::Step { error: true, .. })
    }

    pub fn number(&self) -> Option<u32> {
        match self {
            Instruction::Header { .. } => None,
            Instruction::Step { number, .. } => *number,
        }
    }
}

/// Display numbers for an instruction list.
///
/// Headers get no number. Steps keep their parsed number when present;
/// otherwise the running count of steps seen so far is synthesized. The
/// count enumerates non-header entries directly, so headers interleaved
/// between steps cannot skew the sequence.
pub fn display_numbers(instructions: &[Instruction]) -> Vec<Option<u32>> {
    let mut seen = 0u32;
    instructions
        .iter()
        .map(|instruction| match instruction {
            Instruction::Header { .. } => None,
            Instruction::Step { number, .. } => {
                seen += 1;
                Some(number.unwrap_or(seen))
            }
        })
        .collect()
}

/// Macro-nutrients stated by the model response.
///
/// The four core fields default to 0 when the response committed to a
/// nutrition section without stating them; the optional fields are only
/// present when the text actually stated them. Nothing is fabricated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroNutrients {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<u32>,
}

/// A generated food article.
///
/// Same non-empty-after-normalization contract as [`Recipe`] for title,
/// content and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Markdown-formatted prose, kept as produced by the model
    pub content: String,
    pub summary: String,
    #[serde(default)]
    pub image_url: String,
    /// Free-text estimate (e.g. "4 min read")
    pub read_time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
}

/// Discriminates the two record families in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Recipe,
    Article,
}

/// A record as accepted by the store, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub kind: RecordKind,
    pub title: String,
    /// The full Recipe or Article serialized as JSON
    pub payload: serde_json::Value,
}

/// A record as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub kind: RecordKind,
    pub title: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_numbers_pass_through_explicit_numbers() {
        let instructions = vec![
            Instruction::step("Mix.", Some(1)),
            Instruction::step("Bake.", Some(3)),
        ];
        assert_eq!(display_numbers(&instructions), vec![Some(1), Some(3)]);
    }

    #[test]
    fn test_display_numbers_skip_headers() {
        let instructions = vec![
            Instruction::header("For the sauce"),
            Instruction::step("Whisk everything.", None),
            Instruction::step("Simmer.", Some(7)),
            Instruction::header("For the base"),
            Instruction::step("Knead the dough.", None),
        ];
        // Unnumbered steps count non-header entries only
        assert_eq!(
            display_numbers(&instructions),
            vec![None, Some(1), Some(7), None, Some(3)]
        );
    }

    #[test]
    fn test_error_flag_not_serialized_when_false() {
        let step = Instruction::step("Stir.", None);
        let json = serde_json::to_string(&step).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("number"));
    }

    #[test]
    fn test_macros_optional_fields_absent_when_none() {
        let macros = MacroNutrients {
            calories: 300,
            protein: 0,
            carbs: 0,
            fat: 0,
            fiber: None,
            sugar: None,
            sodium: None,
            saturated_fat: None,
        };
        let json = serde_json::to_string(&macros).unwrap();
        assert!(json.contains("\"calories\":300"));
        assert!(!json.contains("fiber"));
        assert!(!json.contains("sodium"));
    }

    #[test]
    fn test_instruction_roundtrip() {
        let header = Instruction::header("Assembly");
        let json = serde_json::to_string(&header).unwrap();
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(header, back);
        assert!(back.is_header());
    }
}
