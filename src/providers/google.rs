use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::error::DishlensError;
use crate::providers::GenerativeModel;

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, DishlensError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                DishlensError::Provider("GOOGLE_API_KEY not found in config or environment".into())
            })?;

        Ok(GoogleProvider {
            client: Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            model: config.model.clone(),
            image_model: config
                .image_model
                .clone()
                .unwrap_or_else(|| "gemini-2.0-flash-exp-image-generation".to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        GoogleProvider {
            client: Client::new(),
            api_key,
            base_url,
            image_model: model.clone(),
            model,
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    async fn generate(&self, model: &str, body: Value) -> Result<Value, DishlensError> {
        let response = self.client.post(self.endpoint(model)).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DishlensError::Provider(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);
        Ok(response_body)
    }

    fn first_text(response: &Value) -> Result<String, DishlensError> {
        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                DishlensError::MalformedResponse(
                    "no text part in Gemini response".to_string(),
                )
            })
    }
}

#[async_trait]
impl GenerativeModel for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, DishlensError> {
        let response = self
            .generate(
                &self.model,
                json!({
                    "contents": [{
                        "parts": [{"text": format!("{}\n\n{}", system, prompt)}]
                    }],
                    "generationConfig": {
                        "temperature": self.temperature,
                        "maxOutputTokens": self.max_tokens
                    }
                }),
            )
            .await?;
        Self::first_text(&response)
    }

    async fn analyze_image(
        &self,
        system: &str,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, DishlensError> {
        let response = self
            .generate(
                &self.model,
                json!({
                    "contents": [{
                        "parts": [
                            {"text": format!("{}\n\n{}", system, prompt)},
                            {"inline_data": {"mime_type": mime, "data": STANDARD.encode(image)}}
                        ]
                    }],
                    "generationConfig": {
                        "temperature": self.temperature,
                        "maxOutputTokens": self.max_tokens
                    }
                }),
            )
            .await?;
        Self::first_text(&response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, DishlensError> {
        let response = self
            .generate(
                &self.image_model,
                json!({
                    "contents": [{"parts": [{"text": prompt}]}],
                    "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]}
                }),
            )
            .await?;

        let parts = response["candidates"][0]["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        let encoded = parts
            .iter()
            .find_map(|part| {
                part.get("inline_data")
                    .or_else(|| part.get("inlineData"))
                    .and_then(|data| data["data"].as_str())
            })
            .ok_or_else(|| {
                DishlensError::MalformedResponse("no image part in Gemini response".to_string())
            })?;

        STANDARD
            .decode(encoded)
            .map_err(|e| DishlensError::MalformedResponse(format!("invalid image base64: {e}")))
    }
}
