//! # User Service
//!
//! User creation, role management, and suspension over the `users` and
//! `suspended` collections.
//!
//! Suspension is a two-step write with no cross-collection transaction: the
//! role flip lands first, then the reason record. A partial failure leaves
//! the user suspended without a record; the service logs the reconciliation
//! target and surfaces the store error.

use crate::store::{store_err, DocumentStore};
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::Collection;
use shop_core::{parse_object_id, ShopError, ShopResult, SuspensionRecord, UserRecord};
use tracing::{error, info, instrument};

/// Result of an idempotent-by-email user create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created(ObjectId),
    /// A record with this email already exists; nothing was mutated
    AlreadyExists,
}

#[derive(Clone)]
pub struct UserService {
    users: Collection<UserRecord>,
    suspensions: Collection<SuspensionRecord>,
}

impl UserService {
    pub fn new(store: &DocumentStore) -> Self {
        Self {
            users: store.users(),
            suspensions: store.suspensions(),
        }
    }

    /// Full unpaginated dump; acceptable only at demo scale
    pub async fn list(&self) -> ShopResult<Vec<UserRecord>> {
        self.users
            .find(doc! {})
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)
    }

    /// Role lookup by email. A missing user is a typed not-found; an
    /// existing user with no role yet yields `None`.
    pub async fn role_for(&self, email: &str) -> ShopResult<Option<String>> {
        if email.trim().is_empty() {
            return Err(ShopError::Validation("email must not be empty".into()));
        }

        let user = self
            .users
            .find_one(doc! { "userEmail": email })
            .await
            .map_err(store_err)?
            .ok_or_else(|| ShopError::NotFound {
                entity: "user",
                key: email.to_string(),
            })?;

        Ok(user.role)
    }

    /// Idempotent-by-email create: an existing record short-circuits with
    /// no mutation.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: Document) -> ShopResult<CreateUserOutcome> {
        let email = payload
            .get_str("userEmail")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ShopError::Validation("user payload requires userEmail".into()))?
            .to_string();

        let existing = self
            .users
            .find_one(doc! { "userEmail": &email })
            .await
            .map_err(store_err)?;

        if existing.is_some() {
            return Ok(CreateUserOutcome::AlreadyExists);
        }

        let record = UserRecord::new(email, payload);
        let result = self.users.insert_one(&record).await.map_err(store_err)?;

        result
            .inserted_id
            .as_object_id()
            .map(CreateUserOutcome::Created)
            .ok_or_else(|| ShopError::Internal("store returned a non-object-id identity".into()))
    }

    /// Unconditional overwrite of both fields by identity. Caller is
    /// trusted; authorization is out of scope for this demo.
    pub async fn update_role(&self, id: &str, role: &str, status: &str) -> ShopResult<()> {
        let oid = parse_object_id(id)?;

        let result = self
            .users
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "role": role, "status": status } },
            )
            .await
            .map_err(store_err)?;

        if result.matched_count == 0 {
            return Err(ShopError::NotFound {
                entity: "user",
                key: id.to_string(),
            });
        }

        Ok(())
    }

    /// Suspend a user and record the reason.
    ///
    /// The reason record is upserted on `userId`, so concurrent or repeated
    /// suspends keep a single record per user (the later reason wins).
    #[instrument(skip(self, reason))]
    pub async fn suspend(&self, id: &str, reason: Document) -> ShopResult<()> {
        let oid = parse_object_id(id)?;

        let updated = self
            .users
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "role": "suspended", "status": "suspended" } },
            )
            .await
            .map_err(store_err)?;

        if updated.matched_count == 0 {
            return Err(ShopError::NotFound {
                entity: "user",
                key: id.to_string(),
            });
        }

        let record = SuspensionRecord::new(id, reason);
        let record_doc = bson::to_document(&record)
            .map_err(|e| ShopError::Serialization(e.to_string()))?;

        let upsert = self
            .suspensions
            .update_one(doc! { "userId": id }, doc! { "$set": record_doc })
            .upsert(true)
            .await;

        match upsert {
            Ok(_) => {
                info!(user_id = %id, "user suspended");
                Ok(())
            }
            Err(e) => {
                // The role flip already landed; flag the missing record for
                // reconciliation before surfacing the failure.
                error!(
                    user_id = %id,
                    "user marked suspended but reason record write failed, \
                     suspension record needs manual reconciliation: {e}"
                );
                Err(store_err(e))
            }
        }
    }
}
