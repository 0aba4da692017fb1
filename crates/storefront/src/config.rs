//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COMMERCE_GRAPHQL_URL` - GraphQL endpoint of the commerce backend
//!   (e.g., `https://shop.example.com/graphql`)
//!
//! ## Optional
//! - `COMMERCE_STORE_CODE` - store view code sent in the `Store` header
//! - `COMMERCE_INTEGRATION_TOKEN` - server-side integration token, used as
//!   the `Authorization` bearer when no customer is logged in
//! - `COMMERCE_TIMEOUT_SECS` - per-request timeout (default: 30)

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront session-layer configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// GraphQL endpoint of the commerce backend.
    pub graphql_url: Url,
    /// Store view code, sent as the `Store` header when set.
    pub store_code: Option<String>,
    /// Integration token for server-side calls made outside a customer
    /// session. Customer tokens always take precedence.
    pub integration_token: Option<SecretString>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("graphql_url", &self.graphql_url.as_str())
            .field("store_code", &self.store_code)
            .field(
                "integration_token",
                &self.integration_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let graphql_url = get_required_env("COMMERCE_GRAPHQL_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("COMMERCE_GRAPHQL_URL".to_string(), e.to_string())
            })?;
        let store_code = get_optional_env("COMMERCE_STORE_CODE");
        let integration_token =
            get_optional_env("COMMERCE_INTEGRATION_TOKEN").map(SecretString::from);
        let timeout_secs = get_env_or_default("COMMERCE_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("COMMERCE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            graphql_url,
            store_code,
            integration_token,
            timeout_secs,
        })
    }

    /// Build a configuration pointing at a known endpoint, with defaults for
    /// everything else. Used by tests and tools that bypass the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse.
    pub fn for_endpoint(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            graphql_url: url.parse::<Url>().map_err(|e| {
                ConfigError::InvalidEnvVar("COMMERCE_GRAPHQL_URL".to_string(), e.to_string())
            })?,
            store_code: None,
            integration_token: None,
            timeout_secs: 30,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
