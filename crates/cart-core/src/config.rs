//! Cart store configuration.

use std::path::Path;

use cart_kv::cache_key;
use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// What to do when a persisted cart exists but cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Fail store initialization with [`CartError::Decode`].
    #[default]
    Fail,
    /// Log a warning and start with an empty cart.
    Empty,
}

/// Configuration for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Key the cart is persisted under.
    pub storage_key: String,
    /// Handling of an undecodable persisted cart.
    pub on_decode_error: DecodePolicy,
    /// Also write when an operation left the cart unchanged.
    pub persist_unchanged: bool,
}

fn default_storage_key() -> String {
    cache_key!("cart", "items")
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            on_decode_error: DecodePolicy::default(),
            persist_unchanged: false,
        }
    }
}

impl CartConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the decode failure policy.
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.on_decode_error = policy;
        self
    }

    /// Enable or disable writes for unchanged carts.
    pub fn with_persist_unchanged(mut self, enabled: bool) -> Self {
        self.persist_unchanged = enabled;
        self
    }

    /// Parse a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, CartError> {
        let config: Self = toml::from_str(content).map_err(|e| CartError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            let config: Self = serde_json::from_str(&content).map_err(|e| {
                CartError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.storage_key.trim().is_empty() {
            return Err(CartError::Config("storage_key must not be empty".to_string()));
        }
        Ok(())
    }
}
