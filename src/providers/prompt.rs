/// System prompt for analyzing a dish photo.
///
/// Asks for the structured JSON shape the normalizer prefers; the heuristic
/// extractors cover the (frequent) case where the model drifts into prose
/// anyway. The "could not be detected" phrasing is load-bearing: the
/// segmenter recognizes it and flags the result for the UI's empty state.
pub const DISH_ANALYSIS_PROMPT: &str = r#"You are an expert chef. Look at the photo of a dish and reconstruct a recipe for it.

Respond with only this JSON and no other characters:

{
  "title": "<DISH NAME>",
  "description": "<ONE OR TWO SENTENCES>",
  "ingredients": ["<QUANTITY AND INGREDIENT>", ...],
  "instructions": ["<STEP>", ...],
  "cookTime": "<e.g. 20 mins>",
  "prepTime": "<e.g. 10 mins>",
  "servings": <NUMBER>,
  "difficulty": "<Easy|Medium|Hard>",
  "tags": ["<TAG>", ...],
  "macros": {"calories": <N>, "protein": <N>, "carbs": <N>, "fat": <N>}
}

If the photo does not show food, set title to the closest guess and write
"Ingredients could not be detected. Please try again with a clearer image."
as the only ingredient and the matching message as the only instruction."#;

/// System prompt for generating a food article.
pub const ARTICLE_WRITER_PROMPT: &str = r#"You are a food writer with a warm, practical voice.

Respond with only this JSON and no other characters:

{
  "title": "<ARTICLE TITLE>",
  "summary": "<TWO SENTENCES>",
  "content": "<MARKDOWN ARTICLE, 400-700 WORDS>",
  "readTime": "<e.g. 4 min read>",
  "tags": ["<TAG>", ...]
}"#;

/// Prompt for generating a header image for a recipe or article.
pub fn build_image_prompt(subject: &str) -> String {
    format!(
        "A bright, appetizing overhead food photograph of {}, natural light, shallow depth of field, no text or watermarks.",
        subject.trim()
    )
}

/// User prompt for one article topic.
pub fn build_article_prompt(topic: &str) -> String {
    format!("Write an article about: {}", topic.trim())
}
