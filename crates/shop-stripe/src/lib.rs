//! # shop-stripe
//!
//! Stripe Checkout implementation of the `CheckoutGateway` seam.
//!
//! This crate provides:
//! - `StripeConfig` loaded from environment variables
//! - `StripeCheckoutGateway` for hosted-session creation and retrieval
//!
//! Confirmation in this system is webhook-free: the client is redirected
//! back with a session id, and the gateway re-retrieves the session
//! server-to-server to learn its real payment state.

pub mod checkout;
pub mod config;

pub use checkout::StripeCheckoutGateway;
pub use config::StripeConfig;
