//! API Module
//!
//! JSON HTTP surface over the cache store.
//!
//! # Endpoints
//! - `PUT /entries` - Store a value
//! - `GET /entries/:key` - Retrieve a value by key
//! - `DELETE /entries/:key` - Invalidate a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
