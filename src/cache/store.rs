//! Count-Bounded Cache Module
//!
//! LRU cache that holds at most a fixed number of entries.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use tracing::info;

use crate::cache::iter::{Iter, Keys, Values};
use crate::cache::policy::{Capacity, CountPolicy};
use crate::cache::{CacheStats, Lru};
use crate::error::Result;

// == LRU Cache ==
/// Count-bounded LRU cache.
///
/// After every `set`, entries beyond the capacity are evicted from the
/// least recently used end. An unbounded cache never evicts.
#[derive(Debug)]
pub struct LruCache<K, V> {
    inner: Lru<K, V, CountPolicy>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructors ==
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidCapacity`](crate::CacheError::InvalidCapacity)
    /// when `capacity` is 0 or 1.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_capacity(Capacity::bounded(capacity)?)
    }

    /// Creates a cache that never evicts.
    pub fn unbounded() -> Self {
        info!(capacity = %Capacity::Unbounded, "created count-bounded cache");
        Self {
            inner: Lru::new(CountPolicy::new(Capacity::Unbounded)),
        }
    }

    pub fn with_capacity(capacity: Capacity) -> Result<Self> {
        if let Capacity::Bounded(limit) = capacity {
            Capacity::bounded(limit)?;
        }
        info!(capacity = %capacity, "created count-bounded cache");
        Ok(Self {
            inner: Lru::new(CountPolicy::new(capacity)),
        })
    }

    /// Creates a cache seeded with `entries`.
    ///
    /// The last pair becomes the head and the first the tail; when there are
    /// more pairs than capacity, the earliest ones are dropped.
    pub fn from_entries<I>(capacity: Capacity, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::with_capacity(capacity)?;
        for (key, value) in entries {
            cache.set(key, value);
        }
        Ok(cache)
    }

    // == Set ==
    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// Returns the cache for chaining.
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        match self.inner.insert(key, value) {
            Ok(_) => {}
            Err(never) => match never {},
        }
        self
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
    /// Removes `key` and returns its value.
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

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        self.inner.policy().capacity()
    }

    /// Most recently used entry, or None when empty.
    pub fn head(&self) -> Option<(&K, &V)> {
        self.inner.head()
    }

    /// Least recently used entry, or None when empty.
    pub fn tail(&self) -> Option<(&K, &V)> {
        self.inner.tail()
    }

    // == Iteration ==
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.inner.iter()
    }

    /// Alias of [`iter`](Self::iter).
    pub fn entries(&self) -> Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.inner.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.inner.iter())
    }

    /// Calls `visitor` with each value and key, head to tail.
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

impl<'a, K, V> IntoIterator for &'a LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> fmt::Display for LruCache<K, V>
where
    K: Hash + Eq + fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
