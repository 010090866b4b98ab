//! # Application State
//!
//! Shared state for the axum application: store-backed services, the
//! payment flow, and configuration. Dependencies are injected here once at
//! startup rather than reached through module-level globals.

use shop_core::{CheckoutUrls, PaymentFlow};
use shop_store::{CatalogService, DocumentStore, OrderService, StoreConfig, UserService};
use shop_stripe::StripeCheckoutGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storefront base URL for payment redirects
    pub domain: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            domain: std::env::var("DOMAIN").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub flow: PaymentFlow,
    pub store: DocumentStore,
    pub config: AppConfig,
}

impl AppState {
    /// Connect the store, verify it with a ping, and wire up the services
    /// and the Stripe-backed payment flow.
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let store_config = StoreConfig::from_env()?;
        let store = DocumentStore::connect(&store_config).await?;
        store.ping().await?;

        let users = UserService::new(&store);
        let catalog = CatalogService::new(&store);
        let orders = OrderService::new(&store);

        let gateway = StripeCheckoutGateway::from_env()?;
        let flow = PaymentFlow::new(
            Arc::new(gateway),
            Arc::new(orders.clone()),
            CheckoutUrls::new(&config.domain),
        );

        Ok(Self {
            users,
            catalog,
            orders,
            flow,
            store,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            domain: "http://localhost:5173".to_string(),
            environment: "test".to_string(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
