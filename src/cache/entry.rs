//! Cache Entry Module
//!
//! Defines the immutable key/value pair and the list node that carries it.

use crate::cache::arena::SlotId;

// == Entry ==
/// A stored key/value pair.
///
/// Entries are never mutated; updating a key replaces its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Splits the entry into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

// == Node ==
/// Arena-resident list node.
///
/// `prev` points toward the head (more recent), `next` toward the tail.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub entry: Entry<K, V>,
    /// Policy cost charged for this entry
    pub cost: usize,
    pub prev: Option<SlotId>,
    pub next: Option<SlotId>,
}

impl<K, V> Node<K, V> {
    pub fn detached(entry: Entry<K, V>, cost: usize) -> Self {
        Self {
            entry,
            cost,
            prev: None,
            next: None,
        }
    }
}
