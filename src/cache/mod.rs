//! Cache Module
//!
//! Provides a durable, file-backed cache with TTL expiration, pluggable
//! codecs and memoization.

mod clock;
mod codec;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
#[cfg(feature = "yaml")]
pub use codec::YamlCodec;
pub use codec::{Codec, CodecRegistry, JsonCodec, RawCodec};
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsRecorder};
pub use store::{slot_name, CacheStore, LOCK_FILE, SLOT_EXTENSION};
