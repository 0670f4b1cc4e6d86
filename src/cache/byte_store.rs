//! Byte-Bounded Cache Module
//!
//! LRU cache whose limit is the summed byte length of its values.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, info};

use crate::byte_length::TryByteLength;
use crate::cache::iter::{Iter, Keys, Values};
use crate::cache::policy::BytePolicy;
use crate::cache::{CacheStats, Lru};
use crate::error::Result;

// == Byte LRU Cache ==
/// Byte-bounded LRU cache.
///
/// Every value must report a byte length. After each `set`, entries are
/// evicted from the least recently used end until the tally fits the budget,
/// which can include the entry just written when it alone is too large.
/// Call [`accommodate`](Self::accommodate) first to make room ahead of a
/// large write.
#[derive(Debug)]
pub struct ByteLruCache<K, V> {
    inner: Lru<K, V, BytePolicy<V>>,
}

impl<K, V> ByteLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: TryByteLength,
{
    // == Constructors ==
    /// Creates a cache limited to `budget` bytes of values.
    ///
    /// Fails with [`CacheError::InvalidByteBudget`](crate::CacheError::InvalidByteBudget)
    /// when `budget` is 0.
    pub fn new(budget: usize) -> Result<Self> {
        let policy = BytePolicy::new(budget)?;
        info!(budget, "created byte-bounded cache");
        Ok(Self {
            inner: Lru::new(policy),
        })
    }

    /// Creates a cache seeded with `entries`.
    ///
    /// The last pair becomes the head and the first the tail. Room is made
    /// for each value before it is inserted. A value that cannot be measured
    /// aborts construction.
    pub fn from_entries<I>(budget: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::new(budget)?;
        for (key, value) in entries {
            let bytes = value.try_byte_length()?;
            cache.accommodate(bytes);
            cache.set(key, value)?;
        }
        Ok(cache)
    }

    // == Set ==
    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// The value is measured first; an unsupported value returns
    /// [`CacheError::UnsupportedValue`](crate::CacheError::UnsupportedValue)
    /// and leaves the cache as it was.
    pub fn set(&mut self, key: K, value: V) -> Result<&mut Self> {
        self.inner.insert(key, value)?;
        Ok(self)
    }

    // == Accommodate ==
    /// Evicts from the tail until `bytes` more would fit in the budget.
    ///
    /// Stops early only when the cache is empty. The request is taken at face
    /// value: if the following `set` replaces an existing key, its net growth
    /// is smaller and this may have evicted more than strictly needed.
    ///
    /// Returns the number of entries evicted.
    pub fn accommodate(&mut self, bytes: usize) -> usize {
        let mut evicted = 0;
        while self.inner.policy().needs_room(self.inner.usage(), bytes) {
            if self.inner.evict_tail().is_none() {
                break;
            }
            evicted += 1;
        }
        debug!(
            bytes,
            evicted,
            usage = self.inner.usage(),
            "accommodated incoming bytes"
        );
        evicted
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key)
    }

    // == Peek ==
    /// Returns the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.peek(key)
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains(key)
    }

    // == Remove ==
    /// Removes `key`, returning its value and releasing its bytes.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(key)
    }

    /// Removes `key`, returning true if it was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(key).is_some()
    }

    /// Drops every entry and resets the byte tally.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Bytes currently held.
    pub fn bytes_used(&self) -> usize {
        self.inner.usage()
    }

    pub fn budget(&self) -> usize {
        self.inner.policy().budget()
    }

    pub fn head(&self) -> Option<(&K, &V)> {
        self.inner.head()
    }

    pub fn tail(&self) -> Option<(&K, &V)> {
        self.inner.tail()
    }

    // == Iteration ==
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn entries(&self) -> Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.inner.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.inner.iter())
    }

    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&V, &K),
    {
        for (key, value) in self.inner.iter() {
            visitor(value, key);
        }
    }

    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.position(key)
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.inner.check_invariants()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

impl<'a, K, V> IntoIterator for &'a ByteLruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: TryByteLength,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> fmt::Display for ByteLruCache<K, V>
where
    K: Hash + Eq + fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
