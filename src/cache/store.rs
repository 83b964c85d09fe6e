//! Cache Store Module
//!
//! File-backed cache engine: one slot file per key, codec dispatch, atomic
//! writes and lazy TTL expiration.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, CodecRegistry, StatsRecorder, SystemClock};
use crate::config::{Config, DEFAULT_CODEC, DEFAULT_TTL};
use crate::error::{CacheError, Result};

/// File extension of slot files
pub const SLOT_EXTENSION: &str = "cache";

/// Advisory lock file in the cache directory.
///
/// Held exclusively while a slot is renamed into place and while an expired
/// slot is re-checked and removed.
pub const LOCK_FILE: &str = ".lock";

// == Cache Store ==
/// Durable key/value cache backed by a directory of slot files.
///
/// Cloning is cheap and every clone shares the same directory, codecs,
/// clock and statistics. There is no in-memory layer: each call goes to disk.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory holding the slot files
    dir: PathBuf,
    /// Codecs entries may be written and read with
    codecs: CodecRegistry,
    /// Time source for stamping and checking expiration
    clock: Arc<dyn Clock>,
    /// Process-local statistics
    stats: Arc<StatsRecorder>,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl: u64,
    /// Codec used for entries without an explicit codec
    default_codec: String,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store rooted at `dir` using the given codecs.
    ///
    /// The directory is not touched until the first write.
    pub fn new(dir: impl Into<PathBuf>, codecs: CodecRegistry) -> Self {
        Self {
            dir: dir.into(),
            codecs,
            clock: Arc::new(SystemClock),
            stats: Arc::new(StatsRecorder::new()),
            default_ttl: DEFAULT_TTL,
            default_codec: DEFAULT_CODEC.to_string(),
        }
    }

    /// Creates a store with the built-in codecs from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_dir.clone(), CodecRegistry::default())
            .with_default_ttl(config.default_ttl)
            .with_default_codec(config.default_codec.clone())
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the TTL used when `put` is called without one.
    pub fn with_default_ttl(mut self, ttl_seconds: u64) -> Self {
        self.default_ttl = ttl_seconds;
        self
    }

    /// Sets the codec used when `put` is called without one.
    pub fn with_default_codec(mut self, codec: impl Into<String>) -> Self {
        self.default_codec = codec.into();
        self
    }

    // == Put ==
    /// Stores a value under `key`, replacing any existing entry.
    ///
    /// The record is written to a temporary file in the cache directory and
    /// renamed over the slot, so readers see either the previous entry or
    /// this one in full.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - Any serializable value
    /// * `ttl` - TTL in seconds (uses the default TTL if None)
    /// * `codec` - Codec name (uses the default codec if None)
    pub fn put<T>(&self, key: &str, value: &T, ttl: Option<u64>, codec: Option<&str>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl == 0 {
            return Err(CacheError::InvalidRequest(
                "TTL must be at least 1 second".to_string(),
            ));
        }

        let codec_name = codec.unwrap_or(&self.default_codec);
        let codec = self.codecs.get(codec_name)?;

        let value = serde_json::to_value(value)
            .map_err(|e| CacheError::Serialization(format!("value is not serializable: {}", e)))?;
        let payload = codec.encode(&value)?;

        let entry = CacheEntry::new(payload, codec_name, ttl, self.clock.now());
        let bytes = entry.to_bytes()?;

        self.ensure_dir()?;
        let path = self.slot_path(key);
        self.write_atomic(&path, &bytes)?;

        self.stats.record_write();
        debug!(
            key,
            codec = codec_name,
            ttl,
            slot = %path.display(),
            "cache write"
        );
        Ok(())
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Returns `Ok(None)` when there is no entry or the entry has expired;
    /// an expired slot is deleted by this call.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.slot_path(key);
        let Some(entry) = self.load_live(key, &path)? else {
            self.stats.record_miss();
            debug!(key, "cache miss");
            return Ok(None);
        };

        let codec = self.codecs.get(&entry.codec)?;
        let value = codec.decode(&entry.payload)?;
        let value = serde_json::from_value(value).map_err(|e| {
            CacheError::Serialization(format!(
                "cached value does not match requested type: {}",
                e
            ))
        })?;

        self.stats.record_hit();
        debug!(key, codec = %entry.codec, "cache hit");
        Ok(Some(value))
    }

    // == Contains ==
    /// Returns true if `key` has a live entry.
    ///
    /// Applies the same lazy expiry as [`CacheStore::get`] but does not
    /// decode the payload.
    pub fn contains(&self, key: &str) -> Result<bool> {
        let path = self.slot_path(key);
        Ok(self.load_live(key, &path)?.is_some())
    }

    // == Invalidate ==
    /// Removes the entry for `key`. Absent keys are a no-op.
    pub fn invalidate(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                self.stats.record_invalidation();
                debug!(key, slot = %path.display(), "cache invalidate");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::storage(path, e)),
        }
    }

    // == Remember ==
    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// Presence is decided by whether an entry exists, not by the value:
    /// a cached `""`, `0`, `[]` or `null` is a hit. `compute` runs at most
    /// once; its error is returned as-is and nothing is written.
    pub fn remember<T, E, F>(
        &self,
        key: &str,
        compute: F,
        ttl: Option<u64>,
        codec: Option<&str>,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        if let Some(cached) = self.get(key)? {
            return Ok(cached);
        }

        let fresh = compute()?;
        self.put(key, &fresh, ttl, codec)?;
        Ok(fresh)
    }

    // == Accessors ==
    /// Path of the slot file `key` maps to.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", slot_name(key), SLOT_EXTENSION))
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Registered codecs.
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// TTL applied when `put` is called without one.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Internals ==
    /// Reads the slot for `key`, deleting it and returning None if stale.
    fn load_live(&self, key: &str, path: &Path) -> Result<Option<CacheEntry>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::storage(path, e)),
        };

        let entry = CacheEntry::from_bytes(&bytes, path).inspect_err(|e| {
            warn!(key, error = %e, "unreadable cache record");
        })?;

        let now = self.clock.now();
        if !entry.is_expired(now) {
            return Ok(Some(entry));
        }

        self.remove_expired(key, path, now)
    }

    /// Removes the slot for `key` if it is still expired under the lock.
    ///
    /// A writer may have renamed a fresh record into place since the first
    /// read; that record is returned instead of being deleted.
    fn remove_expired(&self, key: &str, path: &Path, now: i64) -> Result<Option<CacheEntry>> {
        let _lock = self.lock_dir()?;

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            // A concurrent reader removed it already
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::storage(path, e)),
        };
        let entry = CacheEntry::from_bytes(&bytes, path)?;
        if !entry.is_expired(now) {
            debug!(key, "expired slot replaced by a concurrent write");
            return Ok(Some(entry));
        }

        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::storage(path, e)),
        }
        self.stats.record_expired();
        info!(
            key,
            expired_for = now - entry.expires_at,
            "removed expired cache entry"
        );
        Ok(None)
    }

    /// Takes the directory-wide advisory lock; released when the file drops.
    fn lock_dir(&self) -> Result<File> {
        let path = self.dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| CacheError::storage(&path, e))?;
        file.lock().map_err(|e| CacheError::storage(&path, e))?;
        Ok(file)
    }

    /// Creates the cache directory on demand.
    fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder
            .create(&self.dir)
            .map_err(|e| CacheError::storage(&self.dir, e))?;

        info!(dir = %self.dir.display(), "created cache directory");
        Ok(())
    }

    /// Writes `bytes` to a temp file beside `path` and renames it into place.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| CacheError::storage(&self.dir, e))?;

        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CacheError::storage(tmp.path(), e))?;

        let _lock = self.lock_dir()?;
        tmp.persist(path)
            .map_err(|e| CacheError::storage(path, e.error))?;
        Ok(())
    }
}

// == Slot Naming ==
/// Lowercase hex SHA-256 of the key; bounded length and filesystem-safe.
pub fn slot_name(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
