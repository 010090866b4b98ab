//! # shop-core
//!
//! Core types and the payment confirmation flow for bazaar-rs.
//!
//! This crate provides:
//! - `ShopError` for typed error handling with stable machine-readable kinds
//! - record models for the `users`, `products`, `orderedProducts`, and
//!   `suspended` collections
//! - `CheckoutGateway` trait for hosted-checkout payment providers
//! - `PaymentFlow`, the session-open + polling-confirmation protocol with
//!   its idempotent order transition
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CheckoutRequest, CheckoutUrls, PaymentFlow};
//!
//! let flow = PaymentFlow::new(gateway, orders, CheckoutUrls::new(domain));
//!
//! // Open a session and redirect the client to session.checkout_url
//! let session = flow.open_session(&request).await?;
//!
//! // On client return, confirm by re-querying the provider
//! match flow.confirm(&session_id).await? {
//!     ConfirmOutcome::Paid { order_id } => { /* order is marked paid */ }
//!     ConfirmOutcome::NotYetPaid { status } => { /* explicit not-paid */ }
//! }
//! ```

pub mod error;
pub mod flow;
pub mod gateway;
pub mod record;

// Re-exports for convenience
pub use error::{ShopError, ShopResult};
pub use flow::{ConfirmOutcome, OrderLedger, PaymentFlow};
pub use gateway::{
    amount_minor_from_price, BoxedCheckoutGateway, CheckoutGateway, CheckoutRequest, CheckoutUrls,
    GatewaySession, SessionPaymentStatus,
};
pub use record::{
    parse_object_id, OrderRecord, ProductRecord, SuspensionRecord, UserRecord,
};
