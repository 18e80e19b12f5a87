//! Cart store configuration.
//!
//! # Environment Variables
//!
//! - `CART_STORAGE_KEY` - Key the cart is persisted under (default:
//!   `@GoMarketPlace:products`)
//! - `CART_STORAGE_PATH` - JSON file used by [`FileStore::from_env`](crate::FileStore::from_env)

use serde::Deserialize;
use thiserror::Error;

/// Key the cart has always been persisted under on device.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketPlace:products";

pub const STORAGE_KEY_ENV: &str = "CART_STORAGE_KEY";
pub const STORAGE_PATH_ENV: &str = "CART_STORAGE_PATH";

/// Configuration errors that can occur during loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Settings for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// The single key used for the initial load and for every write.
    pub storage_key: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Load from the environment, falling back to defaults for unset values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(key) = lookup(STORAGE_KEY_ENV) {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidEnvVar(
                    STORAGE_KEY_ENV.to_string(),
                    "storage key is empty".to_string(),
                ));
            }
            config.storage_key = key;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_legacy_key() {
        assert_eq!(CartConfig::default().storage_key, DEFAULT_STORAGE_KEY);
        let config = CartConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CartConfig::default());
    }

    #[test]
    fn reads_storage_key() {
        let config = CartConfig::from_lookup(|name| {
            (name == STORAGE_KEY_ENV).then(|| "shop:cart".to_string())
        })
        .unwrap();
        assert_eq!(config.storage_key, "shop:cart");
    }

    #[test]
    fn rejects_empty_storage_key() {
        let err = CartConfig::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == STORAGE_KEY_ENV));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: CartConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);

        let config: CartConfig = serde_json::from_str(r#"{"storage_key":"k"}"#).unwrap();
        assert_eq!(config, CartConfig::new().with_storage_key("k"));
    }
}
