//! Cache Entry Module
//!
//! Defines the on-disk record for a single cache entry with TTL support.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Cache Entry ==
/// The record persisted in one slot file.
///
/// Stored as a JSON object whose payload is base64 encoded, so any codec
/// output survives as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
    /// Codec output for the cached value
    #[serde(with = "base64_payload")]
    pub payload: Vec<u8>,
    /// Name of the codec that produced `payload`
    pub codec: String,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_seconds` after `now`.
    ///
    /// # Arguments
    /// * `payload` - Encoded value bytes
    /// * `codec` - Codec name the payload was encoded with
    /// * `ttl_seconds` - Lifetime in seconds
    /// * `now` - Current Unix timestamp in seconds
    pub fn new(payload: Vec<u8>, codec: impl Into<String>, ttl_seconds: u64, now: i64) -> Self {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            expires_at: now.saturating_add(ttl),
            payload,
            codec: codec.into(),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is live up to and including its
    /// `expires_at` second and expired once `now` is strictly past it.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    // == Encoding ==
    /// Serializes the record into the bytes written to a slot file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CacheError::Serialization(format!("cache record encode failed: {}", e)))
    }

    /// Parses a slot file's bytes.
    ///
    /// `path` is only used to report where a corrupt record was found.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::CorruptEntry {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

mod base64_payload {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(b"value".to_vec(), "raw", 60, NOW);

        assert_eq!(entry.payload, b"value");
        assert_eq!(entry.codec, "raw");
        assert_eq!(entry.expires_at, NOW + 60);
        assert!(!entry.is_expired(NOW));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(Vec::new(), "raw", 1, NOW);

        // Still live during its final second
        assert!(!entry.is_expired(NOW + 1));
        assert!(entry.is_expired(NOW + 2));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new(Vec::new(), "json", u64::MAX, NOW);
        assert_eq!(entry.expires_at, i64::MAX);
        assert!(!entry.is_expired(NOW));
    }

    #[test]
    fn test_record_layout() {
        let entry = CacheEntry::new(b"{\"foo\":\"bar\"}".to_vec(), "json", 3600, NOW);
        let bytes = entry.to_bytes().unwrap();
        let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(record["expires_at"], NOW + 3600);
        assert_eq!(record["codec"], "json");
        assert_eq!(record["payload"], "eyJmb28iOiJiYXIifQ==");

        let parsed = CacheEntry::from_bytes(&bytes, Path::new("slot.cache")).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_binary_payload_survives() {
        let entry = CacheEntry::new(vec![0, 159, 146, 150, 255], "raw", 5, NOW);
        let bytes = entry.to_bytes().unwrap();
        let parsed = CacheEntry::from_bytes(&bytes, Path::new("slot.cache")).unwrap();
        assert_eq!(parsed.payload, vec![0, 159, 146, 150, 255]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = CacheEntry::from_bytes(b"not a record", Path::new("bad.cache"));
        assert!(matches!(
            result,
            Err(CacheError::CorruptEntry { ref path, .. }) if path == Path::new("bad.cache")
        ));
    }

    #[test]
    fn test_from_bytes_rejects_missing_fields() {
        let result = CacheEntry::from_bytes(br#"{"expires_at": 1}"#, Path::new("x.cache"));
        assert!(matches!(result, Err(CacheError::CorruptEntry { .. })));
    }

    #[test]
    fn test_from_bytes_rejects_bad_base64() {
        let raw = br#"{"expires_at": 1, "payload": "***", "codec": "raw"}"#;
        let result = CacheEntry::from_bytes(raw, Path::new("x.cache"));
        assert!(matches!(result, Err(CacheError::CorruptEntry { .. })));
    }
}
