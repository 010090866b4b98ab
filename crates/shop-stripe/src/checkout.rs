//! # Stripe Checkout Sessions
//!
//! Implementation of the checkout gateway over the Stripe Checkout Sessions
//! API: session creation for the payment flow, and session retrieval for
//! the webhook-free, redirect-driven confirmation.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shop_core::{
    CheckoutGateway, CheckoutRequest, GatewaySession, SessionPaymentStatus, ShopError, ShopResult,
};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Stripe hosted-checkout gateway
pub struct StripeCheckoutGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutGateway {
    /// Create a new Stripe checkout gateway
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("HTTP client init failed: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    async fn read_body(response: reqwest::Response) -> ShopResult<(reqwest::StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;
        Ok((status, body))
    }

    fn provider_error(status: reqwest::StatusCode, body: &str) -> ShopError {
        error!("Stripe API error: status={}, body={}", status, body);

        if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(body) {
            return ShopError::Provider {
                provider: "stripe".to_string(),
                message: error_response.error.message,
            };
        }

        ShopError::Provider {
            provider: "stripe".to_string(),
            message: format!("HTTP {status}: {body}"),
        }
    }

    fn parse_session(body: &str) -> ShopResult<GatewaySession> {
        let session: StripeSessionObject = serde_json::from_str(body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe session: {e}"))
        })?;
        Ok(session.into())
    }
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutGateway {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_session(
        &self,
        request: &CheckoutRequest,
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<GatewaySession> {
        debug!(
            "Creating Stripe checkout session: amount={} {}",
            request.amount_minor, self.config.currency
        );

        // Single-line-item payment-mode session; the order identity travels
        // in session metadata and comes back on retrieval.
        let form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                format!("Please pay for {}", request.title),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("metadata[orderId]".to_string(), request.order_id.clone()),
            (
                "customer_email".to_string(),
                request.customer_email.clone(),
            ),
        ];

        // Fresh key per call: a transport retry of this request cannot
        // double-create, but a new call for the same order opens a new
        // session by design.
        let idempotency_key = Uuid::new_v4().to_string();

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(Self::provider_error(status, &body));
        }

        let session = Self::parse_session(&body)?;
        info!(
            session_id = %session.session_id,
            "Created Stripe checkout session"
        );
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<GatewaySession> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Self::provider_error(status, &body));
        }

        let session = Self::parse_session(&body)?;
        debug!(
            session_id = %session.session_id,
            status = %session.payment_status,
            "Retrieved Stripe checkout session"
        );
        Ok(session)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default = "default_payment_status")]
    payment_status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    created: Option<i64>,
}

fn default_payment_status() -> String {
    "unpaid".to_string()
}

impl From<StripeSessionObject> for GatewaySession {
    fn from(session: StripeSessionObject) -> Self {
        let created_at = session
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        GatewaySession {
            session_id: session.id,
            checkout_url: session.url,
            payment_status: SessionPaymentStatus::from_provider(&session.payment_status),
            order_id: session.metadata.get("orderId").cloned(),
            amount_total: session.amount_total,
            customer_email: session.customer_email,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(base_url: &str) -> StripeCheckoutGateway {
        let config = StripeConfig::new("sk_test_abc123").with_api_base_url(base_url);
        StripeCheckoutGateway::new(config).unwrap()
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            order_id: "65f2a1b3c4d5e6f708192a3b".into(),
            title: "Chair".into(),
            amount_minor: 50000,
            customer_email: "a@b.com".into(),
        }
    }

    #[tokio::test]
    async fn test_create_session_sends_order_binding() {
        let server = MockServer::start().await;

        // Form keys are url-encoded: [ is %5B, ] is %5D, space is +
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(header_exists("Idempotency-Key"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains(
                "metadata%5BorderId%5D=65f2a1b3c4d5e6f708192a3b",
            ))
            .and(body_string_contains("unit_amount%5D=50000"))
            .and(body_string_contains("currency%5D=bdt"))
            .and(body_string_contains("name%5D=Please+pay+for+Chair"))
            .and(body_string_contains("customer_email=a%40b.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123",
                "payment_status": "unpaid",
                "metadata": { "orderId": "65f2a1b3c4d5e6f708192a3b" },
                "amount_total": 50000,
                "created": 1710000000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = gateway(&server.uri())
            .create_session(
                &request(),
                "https://shop.example.com/dashboard/payment-success?session_id={CHECKOUT_SESSION_ID}",
                "https://shop.example.com/dashboard/payment-cancelled?",
            )
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_123");
        assert_eq!(
            session.checkout_url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_123")
        );
        assert_eq!(session.order_id.as_deref(), Some("65f2a1b3c4d5e6f708192a3b"));
        assert!(!session.payment_status.is_paid());
    }

    #[tokio::test]
    async fn test_retrieve_session_maps_paid_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "url": null,
                "payment_status": "paid",
                "metadata": { "orderId": "65f2a1b3c4d5e6f708192a3b" },
                "amount_total": 50000,
                "customer_email": "a@b.com"
            })))
            .mount(&server)
            .await;

        let session = gateway(&server.uri())
            .retrieve_session("cs_test_123")
            .await
            .unwrap();

        assert!(session.payment_status.is_paid());
        assert_eq!(session.order_id.as_deref(), Some("65f2a1b3c4d5e6f708192a3b"));
        assert_eq!(session.checkout_url, None);
        assert_eq!(session.amount_total, Some(50000));
    }

    #[tokio::test]
    async fn test_retrieve_unknown_session_is_session_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_forged"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "message": "No such checkout.session: 'cs_forged'" }
            })))
            .mount(&server)
            .await;

        let err = gateway(&server.uri())
            .retrieve_session("cs_forged")
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_provider_error_carries_stripe_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid currency: zzz" }
            })))
            .mount(&server)
            .await;

        let err = gateway(&server.uri())
            .create_session(&request(), "https://s.example/s", "https://s.example/c")
            .await
            .unwrap_err();

        match err {
            ShopError::Provider { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid currency: zzz");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_without_metadata_has_no_order_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_bare"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_bare",
                "payment_status": "paid"
            })))
            .mount(&server)
            .await;

        let session = gateway(&server.uri())
            .retrieve_session("cs_bare")
            .await
            .unwrap();

        assert_eq!(session.order_id, None);
        assert!(session.payment_status.is_paid());
    }
}
