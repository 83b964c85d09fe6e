//! Codec Module
//!
//! Named encode/decode pairs that turn cached values into payload bytes and
//! back, plus the registry the store resolves codec names against.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{CacheError, Result};

// == Codec Trait ==
/// An encode/decode pair registered under a name.
///
/// Values cross the codec boundary as [`serde_json::Value`], the structured
/// form every codec can produce and consume.
pub trait Codec: Send + Sync {
    /// Name stored alongside each entry written with this codec.
    fn name(&self) -> &str;

    /// Encodes a value into payload bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decodes payload bytes back into a value.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

// == Raw ==
/// Identity pass-through for string values.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawCodec;

impl Codec for RawCodec {
    fn name(&self) -> &str {
        "raw"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            other => Err(CacheError::Serialization(format!(
                "raw codec only stores strings, got {}",
                value_kind(other)
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| CacheError::Serialization(format!("raw payload is not UTF-8: {}", e)))
    }
}

// == JSON ==
/// Structured encoding through serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| CacheError::Serialization(format!("json encode failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes)
            .map_err(|e| CacheError::Serialization(format!("json decode failed: {}", e)))
    }
}

// == YAML ==
/// Structured encoding through serde_yaml_ng.
#[cfg(feature = "yaml")]
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlCodec;

#[cfg(feature = "yaml")]
impl Codec for YamlCodec {
    fn name(&self) -> &str {
        "yaml"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        serde_yaml_ng::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CacheError::Serialization(format!("yaml encode failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CacheError::Serialization(format!("yaml payload is not UTF-8: {}", e)))?;
        serde_yaml_ng::from_str(text)
            .map_err(|e| CacheError::Serialization(format!("yaml decode failed: {}", e)))
    }
}

// == Codec Registry ==
/// Mapping from codec name to codec.
///
/// `Default` registers the built-in codecs: `raw`, `json`, and `yaml` when
/// the `yaml` feature is enabled.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Creates a registry with no codecs.
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the built-in codecs.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(RawCodec);
        registry.register(JsonCodec);
        #[cfg(feature = "yaml")]
        registry.register(YamlCodec);
        registry
    }

    /// Adds a codec, replacing any codec already registered under its name.
    pub fn register(&mut self, codec: impl Codec + 'static) -> &mut Self {
        self.codecs.insert(codec.name().to_string(), Arc::new(codec));
        self
    }

    /// Looks up a codec by name.
    pub fn get(&self, name: &str) -> Result<&dyn Codec> {
        self.codecs
            .get(name)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| CacheError::unknown_codec(name))
    }

    /// Returns true if a codec is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Registered codec names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.codecs.keys().map(String::as_str).collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.names())
            .finish()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
