use std::collections::HashMap;
use std::sync::Arc;

use dishlens::config::{AppConfig, GenerationConfig, ProviderConfig};
use dishlens::repository::{MemoryRepository, RecordRepository};
use dishlens::{Dishlens, RecordKind};

fn gemini_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
    .to_string()
}

fn test_app_config(base_url: &str) -> AppConfig {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        ProviderConfig {
            enabled: true,
            model: "gemini-2.5-flash".to_string(),
            image_model: None,
            temperature: 0.7,
            max_tokens: 4000,
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url.to_string()),
        },
    );
    AppConfig {
        default_provider: "google".to_string(),
        providers,
        generation: GenerationConfig {
            max_concurrent: 2,
            retry_attempts: 2,
            retry_delay_ms: 1,
            min_call_interval_ms: 0,
            title_retry_attempts: 1,
        },
        repository: None,
        timeout: 30,
    }
}

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent?key=test-key";

#[tokio::test]
async fn test_photo_to_stored_recipe() {
    let mut server = mockito::Server::new_async().await;
    let recipe_json = serde_json::json!({
        "title": "Shakshuka",
        "ingredients": ["4 eggs", "1 can tomatoes"],
        "instructions": ["1. Simmer the tomatoes.", "2. Crack in the eggs."],
        "cookTime": "25 mins",
        "macros": {"calories": 420, "protein": 22, "carbs": 18, "fat": 28}
    });
    let mock = server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(&recipe_json.to_string()))
        .create_async()
        .await;

    let repository = Arc::new(MemoryRepository::new());
    let dishlens = Dishlens::builder()
        .config(test_app_config(&server.url()))
        .repository(repository.clone())
        .build()
        .unwrap();

    let recipe = dishlens
        .analyze_image_bytes(b"fake-jpeg", "image/jpeg")
        .await
        .unwrap();
    assert_eq!(recipe.title, "Shakshuka");
    assert_eq!(recipe.cook_time, "25 mins");
    assert_eq!(recipe.instructions[0].number(), Some(1));
    assert_eq!(recipe.macros.as_ref().unwrap().calories, 420);
    mock.assert_async().await;

    let stored = repository
        .list_recent(5, Some(RecordKind::Recipe))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Shakshuka");
    assert_eq!(stored[0].payload["title"], "Shakshuka");
}

#[tokio::test]
async fn test_sloppy_response_still_yields_recipe() {
    let mut server = mockito::Server::new_async().await;
    // The model ignored the JSON format request and answered in prose
    let prose = "**Spicy Tofu Stir-Fry**\n\nIngredients:\n- 1 block tofu\n- 2 tbsp soy sauce\n\nInstructions:\n1. Press tofu.\n2. Stir-fry 5 minutes.\nCooking Time: 20 mins";
    let _mock = server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(prose))
        .create_async()
        .await;

    let repository = Arc::new(MemoryRepository::new());
    let dishlens = Dishlens::builder()
        .config(test_app_config(&server.url()))
        .repository(repository.clone())
        .build()
        .unwrap();

    let recipe = dishlens
        .analyze_image_bytes(b"fake-jpeg", "image/jpeg")
        .await
        .unwrap();
    assert_eq!(recipe.title, "Spicy Tofu Stir-Fry");
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.cook_time, "20 mins");
}

#[tokio::test]
async fn test_exhausted_retries_surface_and_store_nothing() {
    let mut server = mockito::Server::new_async().await;
    // Every attempt fails; with retry_attempts = 2 the call should be
    // made exactly twice and then give up
    let failure = server
        .mock("POST", GEMINI_PATH)
        .with_status(503)
        .with_body("overloaded")
        .expect(2)
        .create_async()
        .await;

    let repository = Arc::new(MemoryRepository::new());
    let dishlens = Dishlens::builder()
        .config(test_app_config(&server.url()))
        .repository(repository.clone())
        .build()
        .unwrap();

    let results = dishlens.write_articles(vec!["stock".to_string()]).await;
    assert_eq!(results.len(), 1);
    let error = results.into_iter().next().unwrap().unwrap_err();
    assert!(error.to_string().contains("503"));

    failure.assert_async().await;
    assert!(repository.list_recent(5, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_articles_stored_with_unique_titles() {
    let mut server = mockito::Server::new_async().await;
    let article_json = serde_json::json!({
        "title": "Umami",
        "content": "The fifth taste.",
        "summary": "A primer."
    });
    // Every call returns the same title; the batch must still store two
    // distinct records
    let _mock = server
        .mock("POST", GEMINI_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(&article_json.to_string()))
        .expect_at_least(2)
        .create_async()
        .await;

    let repository = Arc::new(MemoryRepository::new());
    let dishlens = Dishlens::builder()
        .config(test_app_config(&server.url()))
        .repository(repository.clone())
        .build()
        .unwrap();

    let results = dishlens
        .write_articles(vec!["umami".to_string(), "the fifth taste".to_string()])
        .await;
    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.is_ok());
    }

    let stored = repository.list_recent(5, None).await.unwrap();
    assert_eq!(stored.len(), 2);
    let mut titles: Vec<&str> = stored.iter().map(|r| r.title.as_str()).collect();
    titles.sort();
    assert_ne!(titles[0], titles[1]);
}
