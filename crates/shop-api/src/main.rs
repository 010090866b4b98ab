//! # bazaar-api
//!
//! Storefront backend over a document store with Stripe-hosted checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MONGODB_URI=mongodb+srv://...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export DOMAIN=https://shop.example.com
//!
//! # Run the server
//! bazaar-api
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state (connects and pings the store)
    let state = AppState::new().await?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment redirects target: {}", state.config.domain);

    // Keep a store handle for teardown; the router owns the state
    let store = state.store.clone();
    let app = routes::create_router(state);

    info!("bazaar-api starting on http://{}", addr);
    if !is_prod {
        info!("Liveness: GET http://{}/", addr);
        info!("Checkout: POST http://{}/payment-checkout-session", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Graceful teardown of the store connection
    store.shutdown().await;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
