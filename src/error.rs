use thiserror::Error;

/// Errors that can occur while talking to providers or the record store.
///
/// The parsing core never produces errors; it degrades to placeholder
/// content instead. Everything here comes from the collaborators around it.
#[derive(Error, Debug)]
pub enum DishlensError {
    /// HTTP request to a provider or the record store failed
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an unusable response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider response body did not have the expected shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Record store rejected or failed an operation
    #[error("Repository error: {0}")]
    Repository(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
