//! # Request Handlers
//!
//! Axum request handlers for the storefront API. Route paths and response
//! field names mirror the storefront client's expectations (`result`,
//! `totalProducts`, `insertedId`, bare role values).

use crate::error::{ApiError, ApiResult};
use crate::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bson::Document;
use serde::Deserialize;
use serde_json::{json, Value};
use shop_core::{
    amount_minor_from_price, CheckoutRequest, ConfirmOutcome, OrderRecord, ProductRecord,
    ShopError, UserRecord,
};
use shop_store::CreateUserOutcome;
use tracing::instrument;

/// Default page size when the client omits `limit`
const DEFAULT_PAGE_LIMIT: i64 = 12;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Pagination query for the product listing.
///
/// Absent values default explicitly; zero and negative limits are rejected
/// with a typed validation error. Non-numeric input is rejected at
/// extraction, never silently coerced to zero.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub skip: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self) -> Result<(i64, u64), ShopError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let skip = self.skip.unwrap_or(0);

        // limit 0 means "unbounded" to the store driver, so it is invalid
        // as a page size.
        if limit <= 0 {
            return Err(ShopError::Validation(format!(
                "limit must be positive, got {limit}"
            )));
        }
        if skip < 0 {
            return Err(ShopError::Validation(format!(
                "skip must be non-negative, got {skip}"
            )));
        }

        Ok((limit, skip as u64))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyOrdersQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /payment-checkout-session`. The price arrives as a string
/// from the storefront but numbers are accepted too.
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    pub order_price: Value,
    pub title: String,
    /// Local order identity, echoed into session metadata
    pub id: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

// =============================================================================
// Liveness
// =============================================================================

pub async fn liveness() -> &'static str {
    "bazaar-rs"
}

// =============================================================================
// Users
// =============================================================================

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let users = state.users.list().await?;
    let users: Vec<Value> = users.into_iter().map(UserRecord::into_json).collect();
    Ok(Json(Value::Array(users)))
}

/// Returns the bare role value (a JSON string, or null when unset), not an
/// object, since the storefront consumes it directly.
pub async fn get_user_role(
    State(state): State<AppState>,
    ValidatedPath(email): ValidatedPath<String>,
) -> ApiResult<Json<Option<String>>> {
    let role = state.users.role_for(&email).await?;
    Ok(Json(role))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<Json<Value>> {
    state
        .users
        .update_role(&id, &request.role, &request.status)
        .await?;
    Ok(Json(json!({ "acknowledged": true })))
}

/// Idempotent-by-email sign-in create
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Document>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    match state.users.create(payload).await? {
        CreateUserOutcome::AlreadyExists => Ok((
            StatusCode::OK,
            Json(json!({ "message": "user already exists" })),
        )),
        CreateUserOutcome::Created(id) => Ok((
            StatusCode::CREATED,
            Json(json!({ "insertedId": id.to_hex() })),
        )),
    }
}

pub async fn suspend_user(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
    ValidatedJson(reason): ValidatedJson<Document>,
) -> ApiResult<Json<Value>> {
    state.users.suspend(&id, reason).await?;
    Ok(Json(json!({ "message": "user suspended", "userId": id })))
}

// =============================================================================
// Catalog
// =============================================================================

pub async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> ApiResult<Json<Value>> {
    let (limit, skip) = params.resolve()?;
    let (page, total) = state.catalog.list(limit, skip).await?;

    let result: Vec<Value> = page.into_iter().map(ProductRecord::into_json).collect();
    Ok(Json(json!({ "result": result, "totalProducts": total })))
}

pub async fn featured_products(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let products = state.catalog.featured().await?;
    let products: Vec<Value> = products.into_iter().map(ProductRecord::into_json).collect();
    Ok(Json(Value::Array(products)))
}

pub async fn product_details(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<String>,
) -> ApiResult<Json<Value>> {
    let product = state.catalog.get(&id).await?;
    Ok(Json(product.into_json()))
}

pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Document>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let id = state.catalog.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "insertedId": id.to_hex() })),
    ))
}

// =============================================================================
// Orders
// =============================================================================

pub async fn place_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Document>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let id = state.orders.place(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "insertedId": id.to_hex() })),
    ))
}

pub async fn my_orders(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MyOrdersQuery>,
) -> ApiResult<Json<Value>> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ShopError::Validation("email query parameter is required".into()))?;

    let orders = state.orders.for_email(&email).await?;
    let orders: Vec<Value> = orders.into_iter().map(OrderRecord::into_json).collect();
    Ok(Json(Value::Array(orders)))
}

// =============================================================================
// Payments
// =============================================================================

/// Open a hosted checkout session and hand the provider URL back for the
/// client redirect.
#[instrument(skip(state, request), fields(order_id = %request.id))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CheckoutSessionRequest>,
) -> ApiResult<Json<Value>> {
    let amount_minor = amount_minor_from_price(&request.order_price)?;

    let checkout = CheckoutRequest {
        order_id: request.id,
        title: request.title,
        amount_minor,
        customer_email: request.email,
    };

    let session = state.flow.open_session(&checkout).await?;
    let url = session.checkout_url.ok_or_else(|| {
        ApiError(ShopError::Provider {
            provider: "stripe".into(),
            message: "session created without a checkout url".into(),
        })
    })?;

    Ok(Json(json!({ "url": url })))
}

/// Confirm a session on client return. Tri-state: paid (order marked),
/// explicit not-yet-paid (no write), or a 404 for an unknown session.
#[instrument(skip(state))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ConfirmQuery>,
) -> ApiResult<Json<Value>> {
    let session_id = query
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ShopError::Validation("session_id query parameter is required".into()))?;

    match state.flow.confirm(&session_id).await? {
        ConfirmOutcome::Paid { order_id } => Ok(Json(json!({
            "paid": true,
            "payment_status": "paid",
            "orderId": order_id,
        }))),
        ConfirmOutcome::NotYetPaid { status } => Ok(Json(json!({
            "paid": false,
            "payment_status": status.as_str(),
        }))),
    }
}
