//! # Catalog Service
//!
//! Product listing, pagination, lookup, and creation over the `products`
//! collection.

use crate::store::{store_err, DocumentStore};
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::Collection;
use shop_core::{parse_object_id, ProductRecord, ShopError, ShopResult};
use tracing::instrument;

/// Number of products on the fixed-size featured listing
pub const FEATURED_LIMIT: i64 = 6;

#[derive(Clone)]
pub struct CatalogService {
    products: Collection<ProductRecord>,
}

impl CatalogService {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            products: store.products(),
        }
    }

    /// Return one page ordered by `createdAt` descending, plus the total
    /// product count. The count is computed against the whole collection,
    /// independent of the page bounds.
    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, skip: u64) -> ShopResult<(Vec<ProductRecord>, u64)> {
        // The driver treats limit 0 as "no limit", so a zero page size must
        // never reach the find call.
        if limit <= 0 {
            return Err(ShopError::Validation(format!(
                "limit must be positive, got {limit}"
            )));
        }

        let page: Vec<ProductRecord> = self
            .products
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .skip(skip)
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)?;

        let total = self
            .products
            .count_documents(doc! {})
            .await
            .map_err(store_err)?;

        Ok((page, total))
    }

    /// The fixed-size most-recent listing for the home page
    pub async fn featured(&self) -> ShopResult<Vec<ProductRecord>> {
        self.products
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .limit(FEATURED_LIMIT)
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)
    }

    /// Exact-id lookup; absent products yield a typed not-found, never a
    /// crash on a missing record
    pub async fn get(&self, id: &str) -> ShopResult<ProductRecord> {
        let oid = parse_object_id(id)?;
        self.products
            .find_one(doc! { "_id": oid })
            .await
            .map_err(store_err)?
            .ok_or_else(|| ShopError::NotFound {
                entity: "product",
                key: id.to_string(),
            })
    }

    /// Insert a new product, stamping `show_on_home=false` and
    /// `createdAt=now` server-side
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: Document) -> ShopResult<ObjectId> {
        if payload.is_empty() {
            return Err(ShopError::Validation("product payload is empty".into()));
        }

        let record = ProductRecord::new(payload);
        let result = self.products.insert_one(&record).await.map_err(store_err)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ShopError::Internal("store returned a non-object-id identity".into()))
    }
}
