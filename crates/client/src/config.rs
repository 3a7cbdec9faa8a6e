//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional and fall back to sensible defaults:
//!
//! - `TIFFIN_API_BASE_URL` - Backend base URL (default: <http://localhost:3000>)
//! - `TIFFIN_DATA_DIR` - Directory for offline storage files (default: `.tiffin`)
//! - `TIFFIN_TRACKING_TICK_MS` - Mock tracking timer interval (default: 3000)
//! - `TIFFIN_VENDOR_CACHE_TTL_SECS` - Vendor read cache TTL (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; API paths are joined onto this.
    pub api_base_url: Url,
    /// Directory holding the offline storage files.
    pub data_dir: PathBuf,
    /// Interval between fabricated tracking updates.
    pub tracking_tick: Duration,
    /// How long vendor reads stay cached in the API client.
    pub vendor_cache_ttl: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("TIFFIN_API_BASE_URL", "http://localhost:3000")
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIFFIN_API_BASE_URL".to_string(), e.to_string())
            })?;

        let data_dir = PathBuf::from(get_env_or_default("TIFFIN_DATA_DIR", ".tiffin"));

        let tracking_tick_ms = get_env_or_default("TIFFIN_TRACKING_TICK_MS", "3000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIFFIN_TRACKING_TICK_MS".to_string(), e.to_string())
            })?;

        let vendor_cache_ttl_secs = get_env_or_default("TIFFIN_VENDOR_CACHE_TTL_SECS", "300")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "TIFFIN_VENDOR_CACHE_TTL_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            api_base_url,
            data_dir,
            tracking_tick: Duration::from_millis(tracking_tick_ms),
            vendor_cache_ttl: Duration::from_secs(vendor_cache_ttl_secs),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // Static string, parse cannot fail
            #[allow(clippy::unwrap_used)]
            api_base_url: "http://localhost:3000".parse().unwrap(),
            data_dir: PathBuf::from(".tiffin"),
            tracking_tick: Duration::from_millis(3000),
            vendor_cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.tracking_tick, Duration::from_millis(3000));
        assert_eq!(config.vendor_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_get_env_or_default_falls_back() {
        assert_eq!(
            get_env_or_default("TIFFIN_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }
}
