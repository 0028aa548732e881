//! Environment-driven configuration for the provider adapters.

/// Configuration for the external providers and the completion service.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the enhanced-transaction provider.
    pub helius_api_key: String,
    /// Base URL for the enhanced-transaction provider.
    pub helius_base_url: String,
    /// Base URL for the entity-metadata provider.
    pub solscan_base_url: String,
    /// Session cookie for the entity-metadata provider.
    pub solscan_cookie: String,
    /// API key for the completion service.
    pub completion_api_key: String,
    /// Base URL for the completion service (OpenAI-compatible).
    pub completion_base_url: String,
    /// Model identifier passed to the completion service.
    pub completion_model: String,
    /// Whether entity-metadata lookups may use the on-disk cache.
    pub use_cache: bool,
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// the public endpoints where a variable is unset.
    pub fn from_env() -> Self {
        Self {
            helius_api_key: std::env::var("HELIUS_API_KEY").unwrap_or_default(),
            helius_base_url: std::env::var("HELIUS_BASE_URL")
                .unwrap_or_else(|_| "https://api.helius.xyz".to_string()),
            solscan_base_url: std::env::var("SOLSCAN_BASE_URL")
                .unwrap_or_else(|_| "https://api-v2.solscan.io/v2".to_string()),
            solscan_cookie: std::env::var("SOLSCAN_COOKIE").unwrap_or_default(),
            completion_api_key: std::env::var("COMPLETION_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_default(),
            completion_base_url: std::env::var("COMPLETION_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            completion_model: std::env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            use_cache: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
