//! # Stripe Configuration
//!
//! Configuration management for the Stripe Checkout integration.
//! All secrets are loaded from environment variables.

use shop_core::ShopError;
use std::env;

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// ISO 4217 currency for checkout line items
    pub currency: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    ///
    /// Optional:
    /// - `STRIPE_CURRENCY` (defaults to `bdt`)
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| ShopError::Configuration("STRIPE_SECRET_KEY not set".to_string()))?;

        let currency = env::var("STRIPE_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|_| "bdt".to_string());

        let config = Self::new(secret_key).with_currency(currency);
        config.validate()?;
        Ok(config)
    }

    /// Create config with an explicit key (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base_url: "https://api.stripe.com".to_string(),
            api_version: "2024-12-18.acacia".to_string(),
            currency: "bdt".to_string(),
        }
    }

    fn validate(&self) -> Result<(), ShopError> {
        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(ShopError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if self.currency.len() != 3 || !self.currency.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(ShopError::Configuration(format!(
                "STRIPE_CURRENCY must be a 3-letter ISO code, got {:?}",
                self.currency
            )));
        }

        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set checkout currency
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = StripeConfig::new("sk_test_abc123");
        assert!(config.is_test_mode());
        assert_eq!(config.currency, "bdt");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_validation() {
        let config = StripeConfig::new("pk_test_wrong_kind");
        assert!(config.validate().is_err());

        let config = StripeConfig::new("sk_live_abc123");
        assert!(!config.is_test_mode());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_currency_validation() {
        let config = StripeConfig::new("sk_test_abc").with_currency("BDT");
        assert!(config.validate().is_err());

        let config = StripeConfig::new("sk_test_abc").with_currency("usd");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }
}
