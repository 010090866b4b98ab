//! # Payment Confirmation Flow
//!
//! The multi-step protocol binding local orders to provider checkout
//! sessions:
//!
//! ```text
//! CREATED ──open_session──▶ SESSION_OPEN ──confirm (provider says paid)──▶ PAID
//! ```
//!
//! `PAID` is terminal and reached at most once per order. A session that
//! never completes leaves the order untouched; there is no FAILED state.
//! Confirmation trusts only the server-to-server session re-query, never the
//! client-supplied redirect parameters, so a forged session id or an unpaid
//! session can never flip an order to paid.

use crate::error::{ShopError, ShopResult};
use crate::gateway::{BoxedCheckoutGateway, CheckoutRequest, CheckoutUrls, GatewaySession, SessionPaymentStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Order-side persistence seam for the confirmation flow.
///
/// `mark_paid` must be idempotent: re-marking an already-paid order is a
/// success with no observable change. Unknown ids yield a typed `NotFound`.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn mark_paid(&self, order_id: &str) -> ShopResult<()>;
}

/// Outcome of a confirmation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Provider reported the session paid; the order is now marked
    Paid { order_id: String },
    /// Provider reported anything other than paid; no write was issued
    NotYetPaid { status: SessionPaymentStatus },
}

/// The payment confirmation flow: session creation plus polling-based
/// confirmation on client redirect.
#[derive(Clone)]
pub struct PaymentFlow {
    gateway: BoxedCheckoutGateway,
    orders: Arc<dyn OrderLedger>,
    urls: CheckoutUrls,
}

impl PaymentFlow {
    pub fn new(
        gateway: BoxedCheckoutGateway,
        orders: Arc<dyn OrderLedger>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            gateway,
            orders,
            urls,
        }
    }

    /// Open a hosted checkout session bound to an order.
    ///
    /// The order itself is not mutated here; a session that is later
    /// abandoned leaves no trace on the order record.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn open_session(&self, request: &CheckoutRequest) -> ShopResult<GatewaySession> {
        if request.title.trim().is_empty() {
            return Err(ShopError::Validation("title must not be empty".into()));
        }
        if request.customer_email.trim().is_empty() {
            return Err(ShopError::Validation("email must not be empty".into()));
        }
        if request.order_id.trim().is_empty() {
            return Err(ShopError::Validation("order id must not be empty".into()));
        }

        let session = self
            .gateway
            .create_session(request, &self.urls.success_url(), &self.urls.cancel_url())
            .await?;

        info!(
            session_id = %session.session_id,
            amount_minor = request.amount_minor,
            provider = self.gateway.provider_name(),
            "opened checkout session"
        );

        Ok(session)
    }

    /// Confirm a checkout session on client return.
    ///
    /// Re-retrieves the session from the provider and marks the bound order
    /// paid only on an explicit `paid` report. Tri-state result: paid,
    /// not-yet-paid (explicit, no silent no-op), or a session-not-found
    /// error surfaced from the gateway.
    #[instrument(skip(self))]
    pub async fn confirm(&self, session_id: &str) -> ShopResult<ConfirmOutcome> {
        if session_id.trim().is_empty() {
            return Err(ShopError::Validation("session_id must not be empty".into()));
        }

        let session = self.gateway.retrieve_session(session_id).await?;

        if !session.payment_status.is_paid() {
            info!(
                status = %session.payment_status,
                "session not paid, leaving order untouched"
            );
            return Ok(ConfirmOutcome::NotYetPaid {
                status: session.payment_status,
            });
        }

        let order_id = session.order_id.ok_or_else(|| {
            warn!("paid session carries no order metadata");
            ShopError::Internal(format!(
                "paid session {session_id} has no orderId metadata"
            ))
        })?;

        self.orders.mark_paid(&order_id).await?;

        info!(%order_id, "order marked paid");
        Ok(ConfirmOutcome::Paid { order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CheckoutGateway;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeGateway {
        sessions: HashMap<String, GatewaySession>,
        seen_urls: Mutex<Vec<(String, String)>>,
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                sessions: HashMap::new(),
                seen_urls: Mutex::new(Vec::new()),
            }
        }

        fn with_session(mut self, status: SessionPaymentStatus, order_id: Option<&str>) -> Self {
            let session = GatewaySession {
                session_id: "cs_test_1".into(),
                checkout_url: Some("https://pay.example.com/cs_test_1".into()),
                payment_status: status,
                order_id: order_id.map(String::from),
                amount_total: Some(50000),
                customer_email: Some("a@b.com".into()),
                created_at: Utc::now(),
            };
            self.sessions.insert(session.session_id.clone(), session);
            self
        }
    }

    #[async_trait]
    impl CheckoutGateway for FakeGateway {
        async fn create_session(
            &self,
            request: &CheckoutRequest,
            success_url: &str,
            cancel_url: &str,
        ) -> ShopResult<GatewaySession> {
            self.seen_urls
                .lock()
                .unwrap()
                .push((success_url.to_string(), cancel_url.to_string()));
            Ok(GatewaySession {
                session_id: "cs_test_new".into(),
                checkout_url: Some("https://pay.example.com/cs_test_new".into()),
                payment_status: SessionPaymentStatus::Unpaid,
                order_id: Some(request.order_id.clone()),
                amount_total: Some(request.amount_minor),
                customer_email: Some(request.customer_email.clone()),
                created_at: Utc::now(),
            })
        }

        async fn retrieve_session(&self, session_id: &str) -> ShopResult<GatewaySession> {
            self.sessions.get(session_id).cloned().ok_or_else(|| {
                ShopError::SessionNotFound {
                    session_id: session_id.to_string(),
                }
            })
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    #[derive(Default)]
    struct FakeLedger {
        known: Vec<String>,
        marked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OrderLedger for FakeLedger {
        async fn mark_paid(&self, order_id: &str) -> ShopResult<()> {
            if !self.known.iter().any(|id| id == order_id) {
                return Err(ShopError::NotFound {
                    entity: "order",
                    key: order_id.to_string(),
                });
            }
            // Re-marking is a success with the same final value
            self.marked.lock().unwrap().push(order_id.to_string());
            Ok(())
        }
    }

    fn flow(gateway: FakeGateway, ledger: FakeLedger) -> (PaymentFlow, Arc<FakeLedger>) {
        let ledger = Arc::new(ledger);
        let flow = PaymentFlow::new(
            Arc::new(gateway),
            ledger.clone(),
            CheckoutUrls::new("https://shop.example.com"),
        );
        (flow, ledger)
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
    async fn test_confirm_marks_order_when_provider_reports_paid() {
        let gateway = FakeGateway::new()
            .with_session(SessionPaymentStatus::Paid, Some("65f2a1b3c4d5e6f708192a3b"));
        let ledger = FakeLedger {
            known: vec!["65f2a1b3c4d5e6f708192a3b".into()],
            ..Default::default()
        };
        let (flow, ledger) = flow(gateway, ledger);

        let outcome = flow.confirm("cs_test_1").await.unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::Paid {
                order_id: "65f2a1b3c4d5e6f708192a3b".into()
            }
        );
        assert_eq!(ledger.marked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_is_explicit_noop_for_unpaid_session() {
        let gateway = FakeGateway::new()
            .with_session(SessionPaymentStatus::Unpaid, Some("65f2a1b3c4d5e6f708192a3b"));
        let ledger = FakeLedger {
            known: vec!["65f2a1b3c4d5e6f708192a3b".into()],
            ..Default::default()
        };
        let (flow, ledger) = flow(gateway, ledger);

        let outcome = flow.confirm("cs_test_1").await.unwrap();
        assert_eq!(
            outcome,
            ConfirmOutcome::NotYetPaid {
                status: SessionPaymentStatus::Unpaid
            }
        );
        assert!(ledger.marked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_double_confirmation_is_idempotent() {
        let gateway = FakeGateway::new()
            .with_session(SessionPaymentStatus::Paid, Some("65f2a1b3c4d5e6f708192a3b"));
        let ledger = FakeLedger {
            known: vec!["65f2a1b3c4d5e6f708192a3b".into()],
            ..Default::default()
        };
        let (flow, _ledger) = flow(gateway, ledger);

        let first = flow.confirm("cs_test_1").await.unwrap();
        let second = flow.confirm("cs_test_1").await.unwrap();
        // Both callers observe success; the final order state is identical
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_confirm_unknown_session_is_typed_error() {
        let (flow, ledger) = flow(FakeGateway::new(), FakeLedger::default());

        let err = flow.confirm("cs_forged").await.unwrap_err();
        assert!(matches!(err, ShopError::SessionNotFound { .. }));
        assert!(ledger.marked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_paid_session_without_metadata_fails() {
        let gateway = FakeGateway::new().with_session(SessionPaymentStatus::Paid, None);
        let (flow, ledger) = flow(gateway, FakeLedger::default());

        let err = flow.confirm("cs_test_1").await.unwrap_err();
        assert!(matches!(err, ShopError::Internal(_)));
        assert!(ledger.marked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_empty_session_id_rejected() {
        let (flow, _) = flow(FakeGateway::new(), FakeLedger::default());
        let err = flow.confirm("  ").await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));
    }

    #[tokio::test]
    async fn test_open_session_passes_redirect_urls() {
        let gateway = Arc::new(FakeGateway::new());
        let flow = PaymentFlow::new(
            gateway.clone(),
            Arc::new(FakeLedger::default()),
            CheckoutUrls::new("https://shop.example.com"),
        );

        let session = flow.open_session(&request()).await.unwrap();
        assert_eq!(session.order_id.as_deref(), Some("65f2a1b3c4d5e6f708192a3b"));
        assert!(session.checkout_url.is_some());

        let seen = gateway.seen_urls.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("session_id={CHECKOUT_SESSION_ID}"));
        assert!(seen[0].1.ends_with("/dashboard/payment-cancelled?"));
    }

    #[tokio::test]
    async fn test_open_session_validates_fields() {
        let (flow, _) = flow(FakeGateway::new(), FakeLedger::default());

        let mut bad = request();
        bad.title = " ".into();
        assert!(matches!(
            flow.open_session(&bad).await.unwrap_err(),
            ShopError::Validation(_)
        ));

        let mut bad = request();
        bad.customer_email = String::new();
        assert!(matches!(
            flow.open_session(&bad).await.unwrap_err(),
            ShopError::Validation(_)
        ));
    }
}
