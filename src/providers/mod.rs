mod factory;
mod google;
mod open_ai;
mod prompt;

pub use factory::ProviderFactory;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{
    build_article_prompt, build_image_prompt, ARTICLE_WRITER_PROMPT, DISH_ANALYSIS_PROMPT,
};

use async_trait::async_trait;

use crate::error::DishlensError;

/// Unified trait for all multimodal model providers.
///
/// Implementations are thin HTTP adapters; everything a provider returns is
/// raw text (or raw image bytes) that the normalizer turns into structure.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider name (e.g. "google", "openai")
    fn provider_name(&self) -> &str;

    /// Generate text for a prompt under a system instruction
    async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, DishlensError>;

    /// Describe an image; `mime` is the image's MIME type, bytes are raw
    async fn analyze_image(
        &self,
        system: &str,
        prompt: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, DishlensError>;

    /// Generate an image, returning raw bytes
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, DishlensError>;
}
