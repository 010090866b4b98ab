//! # Order Service
//!
//! Order placement and listing over the `orderedProducts` collection, plus
//! the `OrderLedger` implementation used by the payment confirmation flow.

use crate::store::{store_err, DocumentStore};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::Collection;
use shop_core::{parse_object_id, OrderLedger, OrderRecord, ShopError, ShopResult};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct OrderService {
    orders: Collection<OrderRecord>,
}

impl OrderService {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            orders: store.orders(),
        }
    }

    /// Insert an order, stamping `orderedAt=now`.
    ///
    /// The client-supplied price is trusted as-is (no stock check, no
    /// server-side recomputation), a known weakness of this demo preserved
    /// by design.
    #[instrument(skip(self, payload))]
    pub async fn place(&self, payload: Document) -> ShopResult<ObjectId> {
        let email = payload
            .get_str("email")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ShopError::Validation("order payload requires a buyer email".into()))?
            .to_string();

        if payload.get_str("title").map(str::trim).unwrap_or("").is_empty() {
            return Err(ShopError::Validation("order payload requires a title".into()));
        }
        if !payload.contains_key("order_price") {
            return Err(ShopError::Validation(
                "order payload requires an order_price".into(),
            ));
        }

        let record = OrderRecord::new(email, payload);
        let result = self.orders.insert_one(&record).await.map_err(store_err)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ShopError::Internal("store returned a non-object-id identity".into()))
    }

    /// Exact-match filter by buyer email, most recent first
    pub async fn for_email(&self, email: &str) -> ShopResult<Vec<OrderRecord>> {
        if email.trim().is_empty() {
            return Err(ShopError::Validation("email query must not be empty".into()));
        }

        self.orders
            .find(doc! { "email": email })
            .sort(doc! { "orderedAt": -1 })
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)
    }
}

#[async_trait]
impl OrderLedger for OrderService {
    /// Set `payment_status="paid"`. The `$set` writes the same final value
    /// on every invocation, so concurrent confirmations of one session are
    /// safe; only the first call observes a modification.
    async fn mark_paid(&self, order_id: &str) -> ShopResult<()> {
        let oid = parse_object_id(order_id)?;

        let result = self
            .orders
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "payment_status": "paid" } },
            )
            .await
            .map_err(store_err)?;

        if result.matched_count == 0 {
            return Err(ShopError::NotFound {
                entity: "order",
                key: order_id.to_string(),
            });
        }

        if result.modified_count == 0 {
            info!(%order_id, "order already marked paid");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    async fn orders() -> OrderService {
        let config = StoreConfig::new("mongodb://localhost:27017", "bazaar_test").unwrap();
        let store = DocumentStore::connect(&config).await.unwrap();
        OrderService::new(&store)
    }

    #[tokio::test]
    async fn test_place_requires_email_and_title_and_price() {
        let orders = orders().await;

        let err = orders
            .place(doc! { "title": "Chair", "order_price": "10" })
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let err = orders
            .place(doc! { "email": "a@b.com", "order_price": "10" })
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));

        let err = orders
            .place(doc! { "email": "a@b.com", "title": "Chair" })
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));
    }

    #[tokio::test]
    async fn test_for_email_rejects_empty_query() {
        let orders = orders().await;
        let err = orders.for_email("  ").await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));
    }

    #[tokio::test]
    async fn test_mark_paid_rejects_malformed_id_before_io() {
        let orders = orders().await;
        let err = orders.mark_paid("abc").await.unwrap_err();
        assert!(matches!(err, ShopError::InvalidId { .. }));
    }
}
