//! LRU Engine Module
//!
//! Recency-ordered entry store shared by every cache variant.
//!
//! Entries live in a doubly linked list whose nodes are owned by a
//! [`SlotArena`] and linked by [`SlotId`]; a `HashMap` maps each key to its
//! node. The list is ordered by recency:
//! - Head = most recently used (position 0)
//! - Tail = least recently used (position `len - 1`)
//!
//! Promotion, insertion, removal and tail eviction are all O(1). A key's
//! position is implicit in the list and is only materialised on request.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::mem;

use tracing::{debug, trace};

use crate::cache::arena::{SlotArena, SlotId};
use crate::cache::entry::{Entry, Node};
use crate::cache::iter::Iter;
use crate::cache::policy::EvictionPolicy;
use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

// == LRU Engine ==
/// Generic recency-ordered store, parameterized by its eviction policy.
#[derive(Debug)]
pub struct Lru<K, V, P> {
    /// Node storage
    nodes: SlotArena<Node<K, V>>,
    /// Key -> node lookup
    index: HashMap<K, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    /// Sum of node costs
    usage: usize,
    policy: P,
    stats: CacheStats,
}

impl<K, V, P> Lru<K, V, P>
where
    K: Hash + Eq,
{
    // == Constructor ==
    /// Creates an empty engine governed by `policy`.
    pub fn new(policy: P) -> Self {
        Self {
            nodes: SlotArena::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            usage: 0,
            policy,
            stats: CacheStats::new(),
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total cost of all held entries.
    pub fn usage(&self) -> usize {
        self.usage
    }

    // == Get ==
    /// Returns the value for `key` and promotes it to the head.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();
        self.move_to_front(id);
        self.nodes.get(id).map(|node| &node.entry.value)
    }

    // == Peek ==
    /// Returns the value for `key` without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.nodes.get(id).map(|node| &node.entry.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Remove ==
    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.remove(key)?;
        self.unlink(id);
        let node = self.nodes.remove(id)?;
        self.usage -= node.cost;
        Some(node.entry.value)
    }

    // == Evict Tail ==
    /// Drops the least recently used entry and returns it.
    pub fn evict_tail(&mut self) -> Option<Entry<K, V>> {
        let id = self.tail?;
        self.unlink(id);
        let node = self.nodes.remove(id)?;
        self.index.remove(&node.entry.key);
        self.usage -= node.cost;
        self.stats.record_eviction();
        debug!(
            cost = node.cost,
            remaining = self.index.len(),
            usage = self.usage,
            "evicted least recently used entry"
        );
        Some(node.entry)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.usage = 0;
    }

    // == Head / Tail ==
    /// Most recently used entry, or None when empty.
    pub fn head(&self) -> Option<(&K, &V)> {
        self.entry_at(self.head)
    }

    /// Least recently used entry, or None when empty.
    pub fn tail(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tail)
    }

    /// Iterates entries from head to tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.head, self.tail, self.len())
    }

    // == Position ==
    /// Zero-based recency position of `key` (0 = head). Walks the list.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let target = *self.index.get(key)?;
        let mut cursor = self.head;
        let mut pos = 0;
        while let Some(id) = cursor {
            if id == target {
                return Some(pos);
            }
            pos += 1;
            cursor = self.nodes.get(id).and_then(|node| node.next);
        }
        None
    }

    // == Stats ==
    /// Snapshot of counters plus current occupancy.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.len(), self.usage);
        stats
    }

    // == Check Invariants ==
    /// Verifies that the list, the index and the usage tally agree.
    ///
    /// Every indexed key must resolve to a live node holding that key, the
    /// links must walk head to tail without gaps, and positions reached from
    /// the head must cover exactly `0..len`.
    pub fn check_invariants(&self) -> Result<()> {
        if self.index.len() != self.nodes.len() {
            return Err(CacheError::Invariant(format!(
                "index holds {} keys but {} nodes are allocated",
                self.index.len(),
                self.nodes.len()
            )));
        }

        let mut pos = 0;
        let mut usage = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            if pos >= self.nodes.len() {
                return Err(CacheError::Invariant(format!(
                    "list is longer than its {} nodes",
                    self.nodes.len()
                )));
            }
            let node = self.nodes.get(id).ok_or_else(|| {
                CacheError::Invariant(format!("position {} refers to a freed slot", pos))
            })?;
            if node.prev != prev {
                return Err(CacheError::Invariant(format!(
                    "broken back link at position {}",
                    pos
                )));
            }
            if self.index.get(&node.entry.key) != Some(&id) {
                return Err(CacheError::Invariant(format!(
                    "key at position {} is not indexed to its node",
                    pos
                )));
            }
            usage += node.cost;
            pos += 1;
            prev = Some(id);
            cursor = node.next;
        }

        if self.tail != prev {
            return Err(CacheError::Invariant(
                "tail does not terminate the list".to_string(),
            ));
        }
        if pos != self.index.len() {
            return Err(CacheError::Invariant(format!(
                "list reaches {} entries but index holds {}",
                pos,
                self.index.len()
            )));
        }
        if usage != self.usage {
            return Err(CacheError::Invariant(format!(
                "usage tally is {} but entries cost {}",
                self.usage, usage
            )));
        }
        Ok(())
    }

    // == List Plumbing ==
    fn entry_at(&self, id: Option<SlotId>) -> Option<(&K, &V)> {
        let node = self.nodes.get(id?)?;
        Some((&node.entry.key, &node.entry.value))
    }

    /// Detaches `id` from its neighbours, fixing head/tail.
    fn unlink(&mut self, id: SlotId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.nodes.get_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.nodes.get_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Links a detached node in front of the current head.
    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(head_node) = self.nodes.get_mut(h) {
                    head_node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn move_to_front(&mut self, id: SlotId) {
        if self.head == Some(id) {
            return;
        }
        self.unlink(id);
        self.attach_front(id);
        trace!("promoted entry to head");
    }
}

impl<K, V, P> Lru<K, V, P>
where
    K: Hash + Eq + Clone,
    P: EvictionPolicy<V>,
{
    // == Insert ==
    /// Stores `value` under `key` at the head, then evicts while over budget.
    ///
    /// An existing entry for `key` is replaced and its old value returned.
    /// The value is costed before anything changes, so a rejected value
    /// leaves the engine untouched. The new entry itself may be evicted if
    /// it alone exceeds the limit.
    pub fn insert(&mut self, key: K, value: V) -> std::result::Result<Option<V>, P::Error> {
        let cost = self.policy.cost(&value)?;

        let previous = match self.index.get(&key).copied() {
            Some(id) => {
                let replaced = self.nodes.get_mut(id).map(|node| {
                    let old_cost = mem::replace(&mut node.cost, cost);
                    let old = mem::replace(&mut node.entry, Entry::new(key, value));
                    (old_cost, old.value)
                });
                self.move_to_front(id);
                replaced.map(|(old_cost, old_value)| {
                    self.usage = self.usage - old_cost + cost;
                    old_value
                })
            }
            None => {
                let id = self
                    .nodes
                    .insert(Node::detached(Entry::new(key.clone(), value), cost));
                self.index.insert(key, id);
                self.attach_front(id);
                self.usage += cost;
                None
            }
        };
        trace!(cost, len = self.index.len(), usage = self.usage, "stored entry at head");

        self.evict_overflow();
        Ok(previous)
    }

    // == Evict Overflow ==
    /// Evicts from the tail until the policy is satisfied.
    ///
    /// Returns the number of entries evicted.
    pub fn evict_overflow(&mut self) -> usize {
        let mut evicted = 0;
        while self.policy.over_budget(self.index.len(), self.usage) {
            if self.evict_tail().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }
}

/// Renders one line per entry, head first, with a 1-based ordinal.
impl<K, V, P> fmt::Display for Lru<K, V, P>
where
    K: Hash + Eq + fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ordinal, (key, value)) in self.iter().enumerate() {
            writeln!(f, "{}. {} => {}", ordinal + 1, key, value)?;
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::policy::{Capacity, CountPolicy};

    fn engine(limit: usize) -> Lru<String, u32, CountPolicy> {
        Lru::new(CountPolicy::new(Capacity::Bounded(limit)))
    }

    fn insert(lru: &mut Lru<String, u32, CountPolicy>, key: &str, value: u32) {
        match lru.insert(key.to_string(), value) {
            Ok(_) => {}
            Err(never) => match never {},
        }
    }

    fn order(lru: &Lru<String, u32, CountPolicy>) -> Vec<String> {
        lru.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn test_lru_new() {
        let lru = engine(3);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert!(lru.head().is_none());
        assert!(lru.tail().is_none());
        lru.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_insert_orders_head_first() {
        let mut lru = engine(5);
        insert(&mut lru, "key1", 1);
        insert(&mut lru, "key2", 2);
        insert(&mut lru, "key3", 3);

        assert_eq!(order(&lru), vec!["key3", "key2", "key1"]);
        assert_eq!(lru.head(), Some((&"key3".to_string(), &3)));
        assert_eq!(lru.tail(), Some((&"key1".to_string(), &1)));
        lru.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_get_promotes() {
        let mut lru = engine(5);
        insert(&mut lru, "a", 1);
        insert(&mut lru, "b", 2);
        insert(&mut lru, "c", 3);

        assert_eq!(lru.get("a"), Some(&1));
        assert_eq!(order(&lru), vec!["a", "c", "b"]);
        lru.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_peek_does_not_promote() {
        let mut lru = engine(5);
        insert(&mut lru, "a", 1);
        insert(&mut lru, "b", 2);

        assert_eq!(lru.peek("a"), Some(&1));
        assert_eq!(order(&lru), vec!["b", "a"]);
        assert_eq!(lru.stats().hits, 0);
    }

    #[test]
    fn test_lru_replace_keeps_single_entry() {
        let mut lru = engine(5);
        insert(&mut lru, "a", 1);
        insert(&mut lru, "b", 2);

        let previous = lru.insert("a".to_string(), 10);
        assert_eq!(previous, Ok(Some(1)));
        assert_eq!(lru.len(), 2);
        assert_eq!(order(&lru), vec!["a", "b"]);
        assert_eq!(lru.peek("a"), Some(&10));
        lru.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_evicts_tail_over_capacity() {
        let mut lru = engine(2);
        insert(&mut lru, "a", 1);
        insert(&mut lru, "b", 2);
        insert(&mut lru, "c", 3);

        assert_eq!(order(&lru), vec!["c", "b"]);
        assert!(!lru.contains("a"));
        assert_eq!(lru.stats().evictions, 1);
        lru.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_remove_middle_head_and_tail() {
        let mut lru = engine(5);
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            insert(&mut lru, key, i as u32);
        }

        assert_eq!(lru.remove("b"), Some(1));
        lru.check_invariants().unwrap();
        assert_eq!(lru.remove("d"), Some(3));
        lru.check_invariants().unwrap();
        assert_eq!(lru.remove("a"), Some(0));
        lru.check_invariants().unwrap();

        assert_eq!(order(&lru), vec!["c"]);
        assert_eq!(lru.remove("missing"), None);
        assert_eq!(lru.usage(), 1);
    }

    #[test]
    fn test_lru_position_is_dense() {
        let mut lru = engine(5);
        for key in ["a", "b", "c", "d"] {
            insert(&mut lru, key, 0);
        }
        lru.get("b");

        let positions: Vec<usize> = ["b", "d", "c", "a"]
            .iter()
            .map(|k| lru.position(*k).unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert_eq!(lru.position("zzz"), None);
    }

    #[test]
    fn test_lru_evict_tail_on_empty() {
        let mut lru = engine(2);
        assert!(lru.evict_tail().is_none());
        assert_eq!(lru.stats().evictions, 0);
    }

    #[test]
    fn test_lru_clear_resets_structure() {
        let mut lru = engine(3);
        insert(&mut lru, "a", 1);
        insert(&mut lru, "b", 2);
        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.usage(), 0);
        assert!(lru.head().is_none());
        lru.check_invariants().unwrap();

        insert(&mut lru, "c", 3);
        assert_eq!(order(&lru), vec!["c"]);
    }

    #[test]
    fn test_lru_display() {
        let mut lru = engine(3);
        insert(&mut lru, "a", 1);
        insert(&mut lru, "b", 2);
        assert_eq!(lru.to_string(), "1. b => 2\n2. a => 1\n");
    }

    #[test]
    fn test_lru_get_records_hits_and_misses() {
        let mut lru = engine(3);
        insert(&mut lru, "a", 1);
        lru.get("a");
        lru.get("nope");

        let stats = lru.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
