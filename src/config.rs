//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default directory for cache slot files
pub const DEFAULT_CACHE_DIR: &str = "storage/framework/cache";

/// Default TTL in seconds (one hour)
pub const DEFAULT_TTL: u64 = 3600;

/// Default codec name used when a caller does not pick one
pub const DEFAULT_CODEC: &str = "json";

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one file per cache entry
    pub cache_dir: PathBuf,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Codec used for entries written without an explicit codec
    pub default_codec: String,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Cache directory (default: storage/framework/cache)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `DEFAULT_CODEC` - Default codec name (default: json)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(DEFAULT_TTL),
            default_codec: env::var("DEFAULT_CODEC")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_CODEC.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Returns a copy of this config pointing at another cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            default_ttl: DEFAULT_TTL,
            default_codec: DEFAULT_CODEC.to_string(),
            server_port: 3000,
        }
    }
}
