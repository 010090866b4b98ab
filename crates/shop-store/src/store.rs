//! # Document Store
//!
//! Connection lifecycle for the MongoDB document store. One handle owns the
//! four collections; there are no cross-collection transactions in this
//! design, so the handle is just a typed window onto the database.

use crate::config::StoreConfig;
use bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use shop_core::{OrderRecord, ProductRecord, ShopError, ShopResult, SuspensionRecord, UserRecord};
use std::time::Duration;
use tracing::info;

/// Map a driver error into the typed store error
pub(crate) fn store_err(err: mongodb::error::Error) -> ShopError {
    ShopError::Store(err.to_string())
}

/// Handle to the document store and its four collections
#[derive(Clone)]
pub struct DocumentStore {
    client: Client,
    db: Database,
}

impl DocumentStore {
    /// Connect to the document store.
    ///
    /// Both dependencies of this service sit across a network, so the client
    /// carries explicit connect and server-selection timeouts; every
    /// operation fails within that bound instead of hanging a request.
    pub async fn connect(config: &StoreConfig) -> ShopResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| ShopError::Configuration(format!("invalid MONGODB_URI: {e}")))?;

        options.app_name = Some("bazaar-rs".to_string());
        options.connect_timeout = Some(Duration::from_secs(10));
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(options)
            .map_err(|e| ShopError::Configuration(format!("client init failed: {e}")))?;
        let db = client.database(&config.database);

        Ok(Self { client, db })
    }

    /// Round-trip to the server to confirm the connection at startup
    pub async fn ping(&self) -> ShopResult<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(store_err)?;
        info!(database = %self.db.name(), "document store reachable");
        Ok(())
    }

    pub fn users(&self) -> Collection<UserRecord> {
        self.db.collection("users")
    }

    pub fn products(&self) -> Collection<ProductRecord> {
        self.db.collection("products")
    }

    pub fn orders(&self) -> Collection<OrderRecord> {
        self.db.collection("orderedProducts")
    }

    pub fn suspensions(&self) -> Collection<SuspensionRecord> {
        self.db.collection("suspended")
    }

    /// Graceful teardown; drains in-flight operations
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}
