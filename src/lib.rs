//! Recency LRU - least-recently-used caching with count or byte limits
//!
//! [`LruCache`] holds at most a fixed number of entries; [`ByteLruCache`]
//! holds at most a fixed number of value bytes, measured through
//! [`ByteLength`]. Both share one recency-ordered engine, [`cache::Lru`].
//!
//! ```
//! use recency_lru::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.set("a", 1).set("b", 2);
//! cache.get("a");
//! cache.set("c", 3);
//!
//! assert!(cache.has("a"));
//! assert!(!cache.has("b"));
//! ```

pub mod byte_length;
pub mod cache;
pub mod config;
pub mod driver;
pub mod error;

pub use byte_length::{ByteLength, ByteList, TryByteLength, Value};
pub use cache::{ByteLruCache, Capacity, CacheStats, LruCache};
pub use config::Config;
pub use error::{CacheError, Result};
