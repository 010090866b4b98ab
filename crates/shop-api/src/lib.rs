//! # shop-api
//!
//! HTTP API layer for bazaar-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server over the document-store services
//! - The payment-checkout and polling-confirmation endpoints
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness |
//! | GET | `/users` | List users |
//! | POST | `/users` | Create user if absent |
//! | GET | `/users/:email/role` | Bare role value |
//! | PATCH | `/users/:id/role` | Set role and status |
//! | GET | `/all-products` | Paginated list + total |
//! | GET | `/all-products-limited` | Six most recent |
//! | GET | `/productDetails/:id` | Single product |
//! | POST | `/products` | Create product |
//! | POST | `/order-product` | Place order |
//! | GET | `/my-orders` | Orders by buyer email |
//! | POST | `/payment-checkout-session` | Open checkout session |
//! | PATCH | `/payment-success` | Confirm and mark paid |
//! | POST | `/suspend/:id` | Suspend user |

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
