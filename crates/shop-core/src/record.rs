//! # Stored Records
//!
//! Document models for the four collections: `users`, `products`,
//! `orderedProducts`, and `suspended`. Records are schemaless beyond the
//! server-stamped fields, so each model carries a flattened [`Document`]
//! tail for caller-supplied fields.
//!
//! Wire responses render `_id` as a 24-char hex string and timestamps as
//! RFC 3339, via the `into_json` conversions.

use crate::error::{ShopError, ShopResult};
use bson::{oid::ObjectId, Bson, DateTime, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parse a 24-char hex identity string, rejecting malformed input with a
/// typed error instead of deferring to the store.
pub fn parse_object_id(id: &str) -> ShopResult<ObjectId> {
    if id.len() != 24 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ShopError::InvalidId { id: id.to_string() });
    }
    ObjectId::parse_str(id).map_err(|_| ShopError::InvalidId { id: id.to_string() })
}

fn extjson(value: Bson) -> Value {
    value.into_relaxed_extjson()
}

/// A user record in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Unique key in practice; not enforced by a store constraint
    #[serde(rename = "userEmail")]
    pub user_email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Caller-supplied free-form fields
    #[serde(flatten)]
    pub extra: Document,
}

impl UserRecord {
    /// Build a new record from a sign-in payload. Reserved keys are stripped
    /// from the free-form tail so they cannot shadow the typed fields.
    pub fn new(user_email: impl Into<String>, mut extra: Document) -> Self {
        for key in ["_id", "userEmail", "role", "status"] {
            extra.remove(key);
        }
        Self {
            id: None,
            user_email: user_email.into(),
            role: None,
            status: None,
            extra,
        }
    }

    pub fn into_json(self) -> Value {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("_id".into(), Value::String(id.to_hex()));
        }
        map.insert("userEmail".into(), Value::String(self.user_email));
        if let Some(role) = self.role {
            map.insert("role".into(), Value::String(role));
        }
        if let Some(status) = self.status {
            map.insert("status".into(), Value::String(status));
        }
        for (key, value) in self.extra {
            map.insert(key, extjson(value));
        }
        Value::Object(map)
    }
}

/// A product record in the `products` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Server-stamped at creation; products never surface on the home page
    /// until flipped out-of-band
    pub show_on_home: bool,

    /// Server-stamped creation time, the descending sort key for listings
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,

    #[serde(flatten)]
    pub extra: Document,
}

impl ProductRecord {
    pub fn new(mut extra: Document) -> Self {
        for key in ["_id", "show_on_home", "createdAt"] {
            extra.remove(key);
        }
        Self {
            id: None,
            show_on_home: false,
            created_at: DateTime::now(),
            extra,
        }
    }

    pub fn into_json(self) -> Value {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("_id".into(), Value::String(id.to_hex()));
        }
        map.insert("show_on_home".into(), Value::Bool(self.show_on_home));
        map.insert(
            "createdAt".into(),
            Value::String(self.created_at.to_chrono().to_rfc3339()),
        );
        for (key, value) in self.extra {
            map.insert(key, extjson(value));
        }
        Value::Object(map)
    }
}

/// An order record in the `orderedProducts` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Buyer email, the `/my-orders` filter key
    pub email: String,

    /// Server-stamped placement time
    #[serde(rename = "orderedAt")]
    pub ordered_at: DateTime,

    /// Absent until the confirmation flow marks the order `"paid"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

impl OrderRecord {
    pub fn new(email: impl Into<String>, mut extra: Document) -> Self {
        for key in ["_id", "email", "orderedAt", "payment_status"] {
            extra.remove(key);
        }
        Self {
            id: None,
            email: email.into(),
            ordered_at: DateTime::now(),
            payment_status: None,
            extra,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }

    pub fn into_json(self) -> Value {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("_id".into(), Value::String(id.to_hex()));
        }
        map.insert("email".into(), Value::String(self.email));
        map.insert(
            "orderedAt".into(),
            Value::String(self.ordered_at.to_chrono().to_rfc3339()),
        );
        if let Some(payment_status) = self.payment_status {
            map.insert("payment_status".into(), Value::String(payment_status));
        }
        for (key, value) in self.extra {
            map.insert(key, extjson(value));
        }
        Value::Object(map)
    }
}

/// A suspension record in the `suspended` collection.
///
/// One record per user: the store upserts on `userId`, so a re-suspend
/// overwrites the reason rather than accumulating duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspensionRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Back-reference to the suspended user (lookup-only)
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Caller-supplied reason fields
    #[serde(flatten)]
    pub reason: Document,
}

impl SuspensionRecord {
    pub fn new(user_id: impl Into<String>, mut reason: Document) -> Self {
        for key in ["_id", "userId"] {
            reason.remove(key);
        }
        Self {
            id: None,
            user_id: user_id.into(),
            reason,
        }
    }
}
