//! # API Error Mapping
//!
//! Converts typed `ShopError` values into structured JSON error bodies with
//! stable machine-readable kinds and the matching HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shop_core::ShopError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    pub code: u16,
}

/// Newtype so handlers can use `?` on any `ShopResult`
#[derive(Debug)]
pub struct ApiError(pub ShopError);

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.status_code();
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handler return values
pub type ApiResult<T> = Result<T, ApiError>;
