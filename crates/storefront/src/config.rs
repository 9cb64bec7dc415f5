//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API public access token
//! - `OPENAI_API_KEY` - `OpenAI` API key (placeholder and entropy checked)
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `OPENAI_MODEL` - Chat model (default: gpt-4o-mini)
//! - `OPENAI_BASE_URL` - API base URL (default: <https://api.openai.com/v1>)
//! - `OPENAI_TEMPERATURE` - Sampling temperature (default: 0.7)
//! - `OPENAI_MAX_TOKENS` - Reply token limit (default: 1000)
//! - `SHINE_DATA_DIR` - Directory for device storage (default: .shine)
//! - `SHINE_CATALOG_PAGE_SIZE` - Products per catalog page (default: 20)
//! - `SHINE_CATALOG_MAX_PAGES` - Page limit for a catalog refresh (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shopify Storefront API configuration
    pub shopify: ShopifyConfig,
    /// Chat model configuration
    pub openai: OpenAiConfig,
    /// Directory holding the cart and session token
    pub data_dir: PathBuf,
    /// Products requested per catalog page
    pub catalog_page_size: u32,
    /// Maximum pages fetched by a catalog refresh
    pub catalog_max_pages: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .finish()
    }
}

/// Chat completions configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: SecretString,
    /// Model identifier
    pub model: String,
    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum reply tokens
    pub max_tokens: u32,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let shopify = ShopifyConfig::from_env()?;
        let openai = OpenAiConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("SHINE_DATA_DIR", ".shine"));
        let catalog_page_size = get_parsed_env("SHINE_CATALOG_PAGE_SIZE", 20)?;
        let catalog_max_pages = get_parsed_env("SHINE_CATALOG_MAX_PAGES", 10)?;

        if catalog_page_size == 0 || catalog_page_size > 250 {
            return Err(ConfigError::InvalidEnvVar(
                "SHINE_CATALOG_PAGE_SIZE".to_string(),
                "must be between 1 and 250".to_string(),
            ));
        }

        Ok(Self {
            shopify,
            openai,
            data_dir,
            catalog_page_size,
            catalog_max_pages,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env("SHOPIFY_STORE")?;
        let store = store
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();
        if store.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_STORE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            store,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2024-01"),
            storefront_token: get_required_secret("SHOPIFY_STOREFRONT_TOKEN")?,
        })
    }
}

impl OpenAiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let temperature: f32 = get_parsed_env("OPENAI_TEMPERATURE", 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidEnvVar(
                "OPENAI_TEMPERATURE".to_string(),
                "must be between 0 and 2".to_string(),
            ));
        }

        Ok(Self {
            api_key: get_validated_secret("OPENAI_API_KEY")?,
            model: get_env_or_default("OPENAI_MODEL", "gpt-4o-mini"),
            base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            temperature,
            max_tokens: get_parsed_env("OPENAI_MAX_TOKENS", 1000)?,
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

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get_optional_env(key).map_or(Ok(default), |value| parse_value(key, &value))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
