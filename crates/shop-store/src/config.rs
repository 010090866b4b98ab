//! # Store Configuration
//!
//! Connection settings for the document store, loaded from environment
//! variables.

use shop_core::{ShopError, ShopResult};
use std::env;

/// Document store connection configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection string (mongodb:// or mongodb+srv://)
    pub uri: String,

    /// Database name holding the four collections
    pub database: String,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MONGODB_URI`
    ///
    /// Optional:
    /// - `MONGODB_DB` (defaults to `bazaar`)
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let uri = env::var("MONGODB_URI")
            .map_err(|_| ShopError::Configuration("MONGODB_URI not set".to_string()))?;

        let database = env::var("MONGODB_DB").unwrap_or_else(|_| "bazaar".to_string());

        Self::new(uri, database)
    }

    /// Create config with explicit values (for testing)
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> ShopResult<Self> {
        let uri = uri.into();
        let database = database.into();

        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err(ShopError::Configuration(
                "MONGODB_URI must start with mongodb:// or mongodb+srv://".to_string(),
            ));
        }

        if database.is_empty() {
            return Err(ShopError::Configuration(
                "MONGODB_DB must not be empty".to_string(),
            ));
        }

        Ok(Self { uri, database })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_accepts_both_schemes() {
        assert!(StoreConfig::new("mongodb://localhost:27017", "bazaar").is_ok());
        assert!(StoreConfig::new("mongodb+srv://cluster0.example.net", "bazaar").is_ok());
    }

    #[test]
    fn test_config_rejects_bad_uri() {
        let result = StoreConfig::new("postgres://localhost", "bazaar");
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }

    #[test]
    fn test_config_rejects_empty_database() {
        let result = StoreConfig::new("mongodb://localhost:27017", "");
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }
}
