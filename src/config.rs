use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    pub providers: HashMap<String, ProviderConfig>,
    /// Batch generation behavior (concurrency, retry, pacing)
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Remote record store; absent means the in-memory store
    #[serde(default)]
    pub repository: Option<RepositoryConfig>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific model provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier for text and vision (e.g. "gemini-2.5-flash")
    pub model: String,
    /// Model identifier for image generation; provider default when absent
    pub image_model: Option<String>,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Configuration for batch generation behavior.
///
/// These knobs all live on the orchestrator instance; there is no
/// process-wide rate-limit state anywhere in the crate.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Maximum generation requests in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Attempts per remote call before giving up
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Base delay between retries in milliseconds (grows linearly per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Minimum delay between consecutive remote calls in milliseconds
    #[serde(default = "default_min_call_interval_ms")]
    pub min_call_interval_ms: u64,
    /// Regeneration attempts when a batch produces a duplicate title,
    /// before falling back to a disambiguating suffix
    #[serde(default = "default_title_retry_attempts")]
    pub title_retry_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            min_call_interval_ms: default_min_call_interval_ms(),
            title_retry_attempts: default_title_retry_attempts(),
        }
    }
}

/// Configuration for the remote record store
#[derive(Debug, Deserialize, Clone)]
pub struct RepositoryConfig {
    /// Base URL of the record store API
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: Option<String>,
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_max_concurrent() -> usize {
    2
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_min_call_interval_ms() -> u64 {
    1500
}

fn default_title_retry_attempts() -> u32 {
    2
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with DISHLENS__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: DISHLENS__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: DISHLENS__PROVIDERS__GOOGLE__API_KEY
            .add_source(
                Environment::with_prefix("DISHLENS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
