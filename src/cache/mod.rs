//! Cache Module
//!
//! Provides the recency-ordered engine and its count-bounded and
//! byte-bounded front ends.

mod arena;
mod byte_store;
mod entry;
mod iter;
mod lru;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use byte_store::ByteLruCache;
pub use entry::Entry;
pub use iter::{Iter, Keys, Values};
pub use lru::Lru;
pub use policy::{BytePolicy, Capacity, CountPolicy, EvictionPolicy};
pub use stats::CacheStats;
pub use store::LruCache;
