//! Error types for the tag cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Backend Error ==
/// Failure reported by a backend store. Passed through to callers unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The store could not be reached or refused the operation
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the payload
    #[error("Backend rejected value: {0}")]
    Rejected(String),
}

// == Keeper Error ==
/// Failure reported by a keeper. Only the tag sync engine ever sees these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeeperError {
    /// Publishing a tag instant failed
    #[error("Keeper write failed for tag '{tag}': {reason}")]
    Write { tag: String, reason: String },

    /// Loading the global tag map failed
    #[error("Keeper load failed: {0}")]
    Load(String),
}

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A stored envelope lacks one of the required fields
    #[error("UnExpectCacheValue")]
    UnexpectedCacheValue,

    /// Error propagated verbatim from the backend store
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The value could not be represented as JSON
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key not found (or no longer readable) in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::UnexpectedCacheValue => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
