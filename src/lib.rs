//! Durable Cache - A file-backed key/value cache
//!
//! Stores one file per key with per-entry TTL, pluggable codecs, atomic
//! writes and a `remember` helper for memoizing expensive computations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheStore, CodecRegistry};
pub use config::Config;
pub use error::{CacheError, Result};
