//! API Handlers
//!
//! HTTP request handlers for each cache endpoint. Store calls do blocking
//! file I/O, so they run on tokio's blocking pool.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::CacheStore;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, PutRequest, PutResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The store is cheap to clone and needs no lock: the cache directory is
/// the only shared resource.
#[derive(Clone)]
pub struct AppState {
    /// File-backed cache store
    pub cache: CacheStore,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Initializes the cache store with parameters from the Config.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(CacheStore::from_config(config))
    }
}

/// Runs a store operation on the blocking pool.
async fn run_blocking<T, F>(op: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| CacheError::Internal(format!("cache task failed: {}", e)))?
}

/// Handler for PUT /entries
///
/// Stores a value in the cache with optional TTL and codec.
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.cache.clone();
    let expires_in = req.ttl.unwrap_or(cache.default_ttl());
    let key = req.key.clone();
    run_blocking(move || cache.put(&req.key, &req.value, req.ttl, req.codec.as_deref())).await?;

    Ok(Json(PutResponse::new(key, expires_in)))
}

/// Handler for GET /entries/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let cache = state.cache.clone();
    let lookup = key.clone();
    let value = run_blocking(move || cache.get::<Value>(&lookup))
        .await
        .map_err(|e| match e {
            // The stored record no longer decodes; nothing the client sent
            CacheError::Serialization(msg) => CacheError::Internal(msg),
            other => other,
        })?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /entries/:key
///
/// Invalidates a key. Absent keys succeed as well.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let cache = state.cache.clone();
    let target = key.clone();
    run_blocking(move || cache.invalidate(&target)).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
