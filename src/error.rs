//! Error types for the durable cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache store and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache directory or a slot file could not be created, written,
    /// renamed, read or removed
    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Unknown codec, or a value the codec cannot encode/decode
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An on-disk record that does not parse into a cache entry
    #[error("Corrupt cache entry at {}: {reason}", .path.display())]
    CorruptEntry { path: PathBuf, reason: String },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps an I/O error with the path it happened on.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Builds a serialization error for a codec name missing from the registry.
    pub fn unknown_codec(name: &str) -> Self {
        CacheError::Serialization(format!("Unknown codec: {}", name))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Storage { .. }
            | CacheError::CorruptEntry { .. }
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
