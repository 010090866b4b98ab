//! # shop-store
//!
//! MongoDB document-store adapter for bazaar-rs.
//!
//! This crate provides:
//! - `DocumentStore` connection lifecycle (connect, ping, shutdown)
//! - `CatalogService` for product listing, pagination, and creation
//! - `OrderService` for order placement, listing, and the paid transition
//! - `UserService` for user creation, role management, and suspension
//!
//! Four independent collections back the services: `users`, `products`,
//! `orderedProducts`, and `suspended`. No cross-collection transactions.

pub mod catalog;
pub mod config;
pub mod orders;
pub mod store;
pub mod users;

// Re-exports for convenience
pub use catalog::{CatalogService, FEATURED_LIMIT};
pub use config::StoreConfig;
pub use orders::OrderService;
pub use store::DocumentStore;
pub use users::{CreateUserOutcome, UserService};
