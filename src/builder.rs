use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::DishlensError;
use crate::model::{Article, Recipe};
use crate::orchestrator::GenerationOrchestrator;
use crate::providers::ProviderFactory;
use crate::repository::{MemoryRepository, RecordRepository, RestRepository};

/// Model provider selection for the builder API
#[derive(Debug, Clone, Copy)]
pub enum ProviderKind {
    Google,
    OpenAI,
}

impl ProviderKind {
    /// Convert to the provider name string used by the factory
    fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAI => "openai",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Google => "gemini-2.5-flash",
            ProviderKind::OpenAI => "gpt-4o-mini",
        }
    }
}

/// Builder for configuring a [`Dishlens`] handle
///
/// # Example
/// ```
/// use dishlens::{Dishlens, ProviderKind};
///
/// let builder = Dishlens::builder()
///     .provider(ProviderKind::Google)
///     .api_key("your-api-key");
/// ```
#[derive(Default)]
pub struct DishlensBuilder {
    provider: Option<ProviderKind>,
    api_key: Option<String>,
    model: Option<String>,
    config: Option<AppConfig>,
    repository: Option<Arc<dyn RecordRepository>>,
}

impl DishlensBuilder {
    /// Select the model provider
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the API key directly instead of relying on configuration or
    /// environment variables
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Use an already-loaded configuration instead of reading
    /// `config.toml` and the environment
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom record store; defaults to the REST store from
    /// configuration, or an in-memory store when none is configured
    pub fn repository(mut self, repository: Arc<dyn RecordRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build the handle
    ///
    /// # Errors
    /// Returns `DishlensError::Builder` when the selected provider is not
    /// configured and no API key was supplied.
    pub fn build(self) -> Result<Dishlens, DishlensError> {
        let config = match self.config {
            Some(config) => config,
            // A missing or partial config file is fine when the builder
            // carries enough to construct a provider itself
            None => AppConfig::load().unwrap_or_else(|_| AppConfig {
                default_provider: "google".to_string(),
                providers: HashMap::new(),
                generation: Default::default(),
                repository: None,
                timeout: 30,
            }),
        };

        let provider_name = self
            .provider
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| config.default_provider.clone());

        let mut provider_config = match config.providers.get(&provider_name) {
            Some(existing) => existing.clone(),
            None => {
                let kind = self.provider.ok_or_else(|| {
                    DishlensError::Builder(format!(
                        "provider '{provider_name}' is not configured; \
                         add it to config.toml or call .provider()"
                    ))
                })?;
                ProviderConfig {
                    enabled: true,
                    model: kind.default_model().to_string(),
                    image_model: None,
                    temperature: 0.7,
                    max_tokens: 4000,
                    api_key: None,
                    base_url: None,
                }
            }
        };
        if let Some(key) = self.api_key {
            provider_config.api_key = Some(key);
        }
        if let Some(model) = self.model {
            provider_config.model = model;
        }

        let provider = ProviderFactory::create(&provider_name, &provider_config)?;

        let repository: Arc<dyn RecordRepository> = match self.repository {
            Some(repository) => repository,
            None => match &config.repository {
                Some(repository_config) => Arc::new(RestRepository::new(repository_config)),
                None => Arc::new(MemoryRepository::new()),
            },
        };

        Ok(Dishlens {
            orchestrator: Arc::new(GenerationOrchestrator::new(
                Arc::from(provider),
                repository,
                &config.generation,
            )),
        })
    }
}

/// Handle over the configured provider, record store, and orchestrator
pub struct Dishlens {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl Dishlens {
    /// Creates a new builder
    ///
    /// # Example
    /// ```
    /// use dishlens::Dishlens;
    ///
    /// let builder = Dishlens::builder();
    /// ```
    pub fn builder() -> DishlensBuilder {
        DishlensBuilder::default()
    }

    /// Analyze a dish photo from disk and store the resulting recipe
    pub async fn analyze_image_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Recipe, DishlensError> {
        let path = path.as_ref();
        let mime = mime_for_extension(path);
        let image = tokio::fs::read(path)
            .await
            .map_err(|e| DishlensError::Builder(format!("failed to read {}: {e}", path.display())))?;
        self.orchestrator.analyze_dish(&image, mime).await
    }

    /// Analyze an in-memory dish photo and store the resulting recipe
    pub async fn analyze_image_bytes(
        &self,
        image: &[u8],
        mime: &str,
    ) -> Result<Recipe, DishlensError> {
        self.orchestrator.analyze_dish(image, mime).await
    }

    /// Generate and store one article per topic, with bounded concurrency
    /// and unique titles within the batch
    pub async fn write_articles(
        &self,
        topics: Vec<String>,
    ) -> Vec<Result<Article, DishlensError>> {
        self.orchestrator.generate_articles(topics).await
    }

    /// Generate a header image for a dish or article subject
    pub async fn illustrate(&self, subject: &str) -> Result<Vec<u8>, DishlensError> {
        self.orchestrator.illustrate(subject).await
    }

    /// Access the record store backing this handle
    pub fn repository(&self) -> Arc<dyn RecordRepository> {
        self.orchestrator.repository()
    }
}

fn mime_for_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
