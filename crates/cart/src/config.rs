//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `INVENTORY_API_URL` - Base URL of the catalog/stock API (default: `http://localhost:3333`)
//! - `INVENTORY_API_TOKEN` - Bearer token sent to the inventory API
//! - `INVENTORY_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - How long catalog entries are cached (default: 300)
//! - `CART_STORAGE_PATH` - File backing local storage (default: `.rocketshoes/storage.json`)
//! - `CART_STORAGE_KEY` - Storage key of the cart snapshot (default: `@RocketShoes:cart`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::storage::CART_SNAPSHOT_KEY;

const DEFAULT_INVENTORY_API_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_CACHE_TTL_SECS: &str = "300";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Inventory API configuration
    pub inventory: InventoryConfig,
    /// Local storage configuration
    pub storage: StorageConfig,
}

/// Inventory (catalog + stock) API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct InventoryConfig {
    /// Base URL; `/products/{id}` and `/stock/{id}` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time-to-live of cached catalog entries
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// JSON file holding the key/value slots
    pub path: PathBuf,
    /// Key of the cart snapshot slot
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
            key: CART_SNAPSHOT_KEY.to_string(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            inventory: InventoryConfig::from_env()?,
            storage: StorageConfig::from_env(),
        })
    }
}

impl InventoryConfig {
    /// Configuration pointing at `base_url` with default timeouts and no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("INVENTORY_API_URL", base_url)?,
            api_token: None,
            timeout: Duration::from_secs(10),
            catalog_cache_ttl: Duration::from_secs(300),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("INVENTORY_API_URL", DEFAULT_INVENTORY_API_URL);

        Ok(Self {
            base_url: parse_base_url("INVENTORY_API_URL", &base_url)?,
            api_token: get_optional_env("INVENTORY_API_TOKEN").map(SecretString::from),
            timeout: get_seconds("INVENTORY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            catalog_cache_ttl: get_seconds("CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            path: PathBuf::from(get_env_or_default("CART_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
            key: get_env_or_default("CART_STORAGE_KEY", CART_SNAPSHOT_KEY),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a duration in whole seconds.
fn get_seconds(key: &str, default: &str) -> Result<Duration, ConfigError> {
    parse_seconds(key, &get_env_or_default(key, default))
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a base URL, making sure relative joins keep its path.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    // `Url::join` drops the last path segment unless it ends with a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
