//! # Checkout Gateway Trait
//!
//! Trait seam for hosted-checkout payment providers. The flow never trusts
//! client-reported payment state: confirmation re-retrieves the session
//! server-to-server through this trait.

use crate::error::{ShopError, ShopResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// A request to open a hosted checkout session for one order
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Local order identity, echoed into session metadata for confirmation
    pub order_id: String,

    /// Order title, displayed on the hosted payment page
    pub title: String,

    /// Amount in minor currency units (price × 100, truncated)
    pub amount_minor: i64,

    /// Buyer email, prefilled on the hosted page
    pub customer_email: String,
}

/// Payment state of a provider session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    /// Provider-reported status we do not model; treated as not-yet-paid
    Other(String),
}

impl SessionPaymentStatus {
    pub fn from_provider(status: &str) -> Self {
        match status {
            "paid" => SessionPaymentStatus::Paid,
            "unpaid" => SessionPaymentStatus::Unpaid,
            "no_payment_required" => SessionPaymentStatus::NoPaymentRequired,
            other => SessionPaymentStatus::Other(other.to_string()),
        }
    }

    /// Only an explicit `paid` report permits the order transition
    pub fn is_paid(&self) -> bool {
        matches!(self, SessionPaymentStatus::Paid)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SessionPaymentStatus::Paid => "paid",
            SessionPaymentStatus::Unpaid => "unpaid",
            SessionPaymentStatus::NoPaymentRequired => "no_payment_required",
            SessionPaymentStatus::Other(status) => status,
        }
    }
}

impl std::fmt::Display for SessionPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A checkout session as reported by the provider
#[derive(Debug, Clone)]
pub struct GatewaySession {
    /// Provider's opaque session id
    pub session_id: String,

    /// Hosted payment page URL; absent once the session completes
    pub checkout_url: Option<String>,

    /// Provider-reported payment state
    pub payment_status: SessionPaymentStatus,

    /// Local order id recovered from session metadata
    pub order_id: Option<String>,

    /// Amount in minor units, if reported
    pub amount_total: Option<i64>,

    /// Buyer email bound to the session
    pub customer_email: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Hosted-checkout provider seam.
///
/// `create_session` opens a single-line-item payment-mode session bound to
/// an order; `retrieve_session` re-queries it by id for confirmation.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<GatewaySession>;

    async fn retrieve_session(&self, session_id: &str) -> ShopResult<GatewaySession>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed gateway (dynamic dispatch)
pub type BoxedCheckoutGateway = Arc<dyn CheckoutGateway>;

/// Redirect URLs the provider sends the client back to
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the storefront (e.g. "https://shop.example.com")
    pub base_url: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Success redirect carrying the provider's session-id placeholder,
    /// which the client echoes back to `/payment-success`
    pub fn success_url(&self) -> String {
        format!(
            "{}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/dashboard/payment-cancelled?", self.base_url)
    }
}

/// Compute the minor-unit amount from a caller-supplied price field.
///
/// Accepts a JSON string or number. The amount is price × 100 truncated
/// toward zero, matching the original integer cast; fractional minor units
/// are dropped, a known precision tradeoff.
pub fn amount_minor_from_price(price: &Value) -> ShopResult<i64> {
    let value = match price {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ShopError::Validation(format!("order_price is not numeric: {s:?}")))?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ShopError::Validation(format!("order_price is not numeric: {n}")))?,
        other => {
            return Err(ShopError::Validation(format!(
                "order_price must be a string or number, got {other}"
            )))
        }
    };

    if !value.is_finite() || value < 0.0 {
        return Err(ShopError::Validation(format!(
            "order_price must be a non-negative amount: {value}"
        )));
    }

    let minor = (value * 100.0).trunc();
    if minor > i64::MAX as f64 {
        return Err(ShopError::Validation(format!(
            "order_price out of range: {value}"
        )));
    }

    Ok(minor as i64)
}
