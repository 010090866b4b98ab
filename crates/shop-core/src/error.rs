//! # Error Types
//!
//! Typed error handling for the bazaar-rs backend.
//! All fallible operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for store, catalog, and payment operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed or missing request data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identity string is not a valid 24-char hex object id
    #[error("Invalid object id: {id}")]
    InvalidId { id: String },

    /// Entity absent by id or email
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Document store unreachable or erroring
    #[error("Document store error: {0}")]
    Store(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with an external service
    #[error("Network error: {0}")]
    Network(String),

    /// Checkout session expired or unknown to the provider
    #[error("Checkout session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal invariant violation (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Stable machine-readable kind for error response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ShopError::Configuration(_) => "configuration",
            ShopError::Validation(_) => "validation",
            ShopError::InvalidId { .. } => "invalid_id",
            ShopError::NotFound { .. } => "not_found",
            ShopError::Store(_) => "store_error",
            ShopError::Provider { .. } => "provider_error",
            ShopError::Network(_) => "network_error",
            ShopError::SessionNotFound { .. } => "session_not_found",
            ShopError::Serialization(_) => "serialization_error",
            ShopError::Internal(_) => "internal",
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::Validation(_) => 400,
            ShopError::InvalidId { .. } => 400,
            ShopError::NotFound { .. } => 404,
            ShopError::Store(_) => 503,
            ShopError::Provider { .. } => 502,
            ShopError::Network(_) => 503,
            ShopError::SessionNotFound { .. } => 404,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShopError::Store(_) | ShopError::Network(_) | ShopError::Provider { .. }
        )
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
