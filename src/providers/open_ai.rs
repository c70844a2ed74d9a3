use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::error::DishlensError;
use crate::providers::GenerativeModel;

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, DishlensError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                DishlensError::Provider("OPENAI_API_KEY not found in config or environment".into())
            })?;

        Ok(OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model: config.model.clone(),
            image_model: config
                .image_model
                .clone()
                .unwrap_or_else(|| "gpt-image-1".to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            image_model: "gpt-image-1".to_string(),
            model,
            temperature: 0.7,
            max_tokens: 4000,
        }
    }

    async fn chat(&self, messages: Value) -> Result<String, DishlensError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DishlensError::Provider(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);
        response_body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                DishlensError::MalformedResponse("no content in OpenAI response".to_string())
            })
    }
}

#[async_trait]
impl GenerativeModel for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, DishlensError> {
        self.chat(json!([
            {"role": "system", "content": system},
            {"role": "user", "content": prompt}
        ]))
        .await
    }

    async fn analyze_image(
        &self,
        system: &str,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, DishlensError> {
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(image));
        self.chat(json!([
            {"role": "system", "content": system},
            {"role": "user", "content": [
                {"type": "text", "text": prompt},
                {"type": "image_url", "image_url": {"url": data_url}}
            ]}
        ]))
        .await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, DishlensError> {
        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.image_model,
                "prompt": prompt,
                "n": 1,
                "size": "1024x1024"
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DishlensError::Provider(format!(
                "OpenAI image API error ({status}): {error_text}"
            )));
        }

        let response_body: Value = response.json().await?;
        let encoded = response_body["data"][0]["b64_json"]
            .as_str()
            .ok_or_else(|| {
                DishlensError::MalformedResponse("no image data in OpenAI response".to_string())
            })?;

        STANDARD
            .decode(encoded)
            .map_err(|e| DishlensError::MalformedResponse(format!("invalid image base64: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_generate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices": [{"message": {"content": "{\"title\":\"Ramen\"}"}}]}"#,
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let result = provider.generate_text("system", "prompt").await.unwrap();
        assert!(result.contains("Ramen"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(400)
            .with_body(r#"{"error": "Invalid request"}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let result = provider.generate_text("system", "prompt").await;
        assert!(result.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_image_sends_data_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::Regex("data:image/png;base64".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": "a bowl of soup"}}]}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let result = provider
            .analyze_image("system", "what is this?", b"fake-png", "image/png")
            .await
            .unwrap();
        assert_eq!(result, "a bowl of soup");
        mock.assert_async().await;
    }
}
