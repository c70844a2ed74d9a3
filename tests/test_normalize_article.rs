use dishlens::normalize_article;
use dishlens::parse::CONTENT_PLACEHOLDER;

#[test]
fn test_structured_article_keeps_markdown_body() {
    let raw = r###"{"title":"Why Bread Needs Time","content":"## Fermentation\n\nFlavor is mostly a function of time.","summary":"Slow bread tastes better.","tags":["baking","bread"]}"###;
    let article = normalize_article(raw);
    assert_eq!(article.title, "Why Bread Needs Time");
    assert!(article.content.contains("## Fermentation"));
    assert_eq!(article.summary, "Slow bread tastes better.");
    assert_eq!(article.tags, vec!["baking".to_string(), "bread".to_string()]);
}

#[test]
fn test_structured_article_missing_summary_falls_back() {
    // Without a summary the structured path rejects the payload and the
    // heuristic path takes over, treating the JSON as plain text
    let raw = r#"{"title":"Half Done","content":"Body."}"#;
    let article = normalize_article(raw);
    assert!(!article.title.is_empty());
    assert!(!article.content.is_empty());
    assert!(!article.summary.is_empty());
}

#[test]
fn test_heuristic_article_from_markdown_prose() {
    let raw = "# A Case for Cast Iron\n\nCast iron holds heat the way nothing else in the kitchen does, and it forgives almost any abuse.";
    let article = normalize_article(raw);
    assert_eq!(article.title, "A Case for Cast Iron");
    assert!(article.content.contains("holds heat"));
    assert!(!article.summary.is_empty());
}

#[test]
fn test_read_time_estimated_when_absent() {
    let body: String = "word ".repeat(420);
    let raw = format!(
        r#"{{"title":"Long Read","content":"{}","summary":"Many words."}}"#,
        body.trim()
    );
    let article = normalize_article(&raw);
    assert_eq!(article.read_time, "2 min read");
}

#[test]
fn test_explicit_read_time_kept() {
    let raw = r#"{"title":"Short","content":"Body.","summary":"S","readTime":"7 min read"}"#;
    let article = normalize_article(raw);
    assert_eq!(article.read_time, "7 min read");
}

#[test]
fn test_empty_article_gets_placeholders() {
    let article = normalize_article("");
    assert!(!article.title.is_empty());
    assert_eq!(article.content, CONTENT_PLACEHOLDER);
    assert!(!article.summary.is_empty());
    assert!(!article.read_time.is_empty());
}
