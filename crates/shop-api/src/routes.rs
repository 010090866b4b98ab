//! # Routes
//!
//! Axum router configuration. Paths match the storefront client one-to-one.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
/// - Users:
///   - GET   /users - List all users
///   - POST  /users - Create user if absent (idempotent by email)
///   - GET   /users/{email}/role - Bare role value
///   - PATCH /users/{id}/role - Set role and status
///   - POST  /suspend/{id} - Suspend user and record the reason
///
/// - Catalog:
///   - GET  /all-products - Paginated list plus total count
///   - GET  /all-products-limited - Six most recent
///   - GET  /productDetails/{id} - Single product
///   - POST /products - Create product
///
/// - Orders:
///   - POST /order-product - Place an order
///   - GET  /my-orders - List orders by buyer email
///
/// - Payments:
///   - POST  /payment-checkout-session - Open a hosted checkout session
///   - PATCH /payment-success - Confirm and mark the order paid
pub fn create_router(state: AppState) -> Router {
    // Demo storefront runs on a separate origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness at root
        .route("/", get(handlers::liveness))
        // Users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        // One pattern for both verbs: the GET key is an email, the PATCH
        // key is an object id
        .route(
            "/users/{key}/role",
            get(handlers::get_user_role).patch(handlers::update_user_role),
        )
        .route("/suspend/{id}", post(handlers::suspend_user))
        // Catalog
        .route("/all-products", get(handlers::list_products))
        .route("/all-products-limited", get(handlers::featured_products))
        .route("/productDetails/{id}", get(handlers::product_details))
        .route("/products", post(handlers::create_product))
        // Orders
        .route("/order-product", post(handlers::place_order))
        .route("/my-orders", get(handlers::my_orders))
        // Payments
        .route(
            "/payment-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/payment-success", patch(handlers::confirm_payment))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
