//! Integration Tests for the Public Cache API
//!
//! Exercises both cache variants end to end through the crate root exports.

use recency_lru::{ByteLength, ByteList, ByteLruCache, CacheError, Capacity, LruCache, Value};

// == Helper Functions ==

fn keys<V>(cache: &LruCache<&'static str, V>) -> Vec<&'static str> {
    cache.keys().copied().collect()
}

fn blob(len: usize) -> Vec<u8> {
    vec![0xAB; len]
}

// == Count-Bounded Scenarios ==

#[test]
fn test_seeded_cache_evicts_oldest_on_insert() {
    let seed = ["a", "b", "c", "d", "e"].map(|k| (k, k.to_uppercase()));
    let mut cache = LruCache::from_entries(Capacity::Bounded(5), seed).unwrap();

    assert_eq!(cache.head().map(|(k, _)| *k), Some("e"));
    assert_eq!(cache.tail().map(|(k, _)| *k), Some("a"));

    for key in ["f", "g", "h"] {
        cache.set(key, key.to_uppercase());
        assert_eq!(cache.len(), 5);
    }

    assert_eq!(cache.head().map(|(k, _)| *k), Some("h"));
    assert_eq!(cache.tail().map(|(k, _)| *k), Some("d"));
    assert_eq!(keys(&cache), vec!["h", "g", "f", "e", "d"]);
    cache.check_invariants().unwrap();
}

#[test]
fn test_unbounded_cache_never_evicts() {
    let mut cache = LruCache::unbounded();
    for i in 0..10_000u32 {
        cache.set(i, i * 2);
    }

    assert_eq!(cache.len(), 10_000);
    assert_eq!(cache.capacity(), Capacity::Unbounded);
    assert_eq!(cache.stats().evictions, 0);
    assert_eq!(cache.tail(), Some((&0, &0)));
}

#[test]
fn test_unbounded_from_raw_sentinel() {
    let capacity = Capacity::try_from(-1).unwrap();
    let cache: LruCache<u8, u8> = LruCache::with_capacity(capacity).unwrap();
    assert_eq!(cache.capacity(), Capacity::Unbounded);
}

#[test]
fn test_get_promotes_and_peek_does_not() {
    let mut cache = LruCache::new(3).unwrap();
    cache.set("a", 1).set("b", 2).set("c", 3);

    assert_eq!(cache.peek("a"), Some(&1));
    assert_eq!(keys(&cache), vec!["c", "b", "a"]);

    assert_eq!(cache.get("a"), Some(&1));
    assert_eq!(keys(&cache), vec!["a", "c", "b"]);

    cache.set("d", 4);
    assert!(!cache.has("b"));
    assert_eq!(cache.position("a"), Some(1));
}

#[test]
fn test_index_stays_dense_across_mixed_operations() {
    let mut cache = LruCache::new(4).unwrap();
    cache.set("a", 1).set("b", 2).set("c", 3).set("d", 4);
    cache.get("b");
    cache.remove("c");
    cache.set("e", 5).set("a", 10);
    cache.delete("zzz");

    cache.check_invariants().unwrap();
    let order = keys(&cache);
    assert_eq!(order, vec!["a", "e", "b", "d"]);
    for (pos, key) in order.iter().enumerate() {
        assert_eq!(cache.position(key), Some(pos));
    }
}

#[test]
fn test_invalid_capacity_is_rejected() {
    for capacity in [0, 1] {
        assert!(matches!(
            LruCache::<String, String>::new(capacity),
            Err(CacheError::InvalidCapacity(_))
        ));
    }
    assert!(Capacity::try_from(-5).is_err());
}

#[test]
fn test_entries_iteration_through_reference() {
    let mut cache = LruCache::new(3).unwrap();
    cache.set("x", 1).set("y", 2);

    let mut collected = Vec::new();
    for (key, value) in &cache {
        collected.push((*key, *value));
    }
    assert_eq!(collected, vec![("y", 2), ("x", 1)]);
    assert_eq!(cache.entries().len(), 2);
}

// == Byte-Bounded Scenarios ==

#[test]
fn test_byte_budget_self_eviction_and_replacement() {
    let mut cache = ByteLruCache::new(8192).unwrap();

    cache.set("A", blob(8193)).unwrap();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.bytes_used(), 0);

    cache.set("B", blob(8192)).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.bytes_used(), 8192);

    cache.set("C", blob(6144)).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.bytes_used(), 6144);
    assert!(cache.has("C"));
    assert!(!cache.has("B"));
}

#[test]
fn test_accommodate_evicts_oldest_first() {
    let mut cache = ByteLruCache::new(100).unwrap();
    cache.set("old", blob(40)).unwrap();
    cache.set("mid", blob(30)).unwrap();
    cache.set("new", blob(30)).unwrap();

    assert_eq!(cache.accommodate(0), 0);
    assert_eq!(cache.accommodate(45), 2);
    assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["new"]);
    assert!(cache.bytes_used() + 45 <= cache.budget());

    cache.set("next", blob(35)).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 2);
}

#[test]
fn test_byte_cache_with_dynamic_values() {
    let mut cache = ByteLruCache::new(32).unwrap();
    let parts: ByteList<Value> = vec![Value::from("head"), Value::from(vec![0u8; 12])].into();
    cache.set("doc", Value::List(parts)).unwrap();
    assert_eq!(cache.bytes_used(), 16);

    let err = cache.set("raw", Value::Array(vec![Value::from("x")])).unwrap_err();
    assert_eq!(err, CacheError::UnsupportedValue("array".to_string()));
    assert_eq!(cache.bytes_used(), 16);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_byte_cache_with_nested_byte_lists() {
    let row: ByteList<String> = vec!["ab".to_string(), "cd".to_string()].into();
    let table: ByteList<ByteList<String>> = vec![row.clone(), row.clone(), row].into();
    assert_eq!(table.byte_length(), 12);

    let mut cache = ByteLruCache::new(20).unwrap();
    cache.set(1u8, table.clone()).unwrap();
    cache.set(2u8, table).unwrap();

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.head().map(|(k, _)| *k), Some(2));
}

#[test]
fn test_byte_cache_seeded_construction() {
    let cache = ByteLruCache::from_entries(
        10,
        vec![("a", "1234".to_string()), ("b", "1234".to_string()), ("c", "1234".to_string())],
    )
    .unwrap();

    assert_eq!(cache.head().map(|(k, _)| *k), Some("c"));
    assert_eq!(cache.tail().map(|(k, _)| *k), Some("b"));
    assert_eq!(cache.bytes_used(), 8);
}

#[test]
fn test_invalid_byte_budget_is_rejected() {
    assert_eq!(
        ByteLruCache::<String, String>::new(0).unwrap_err(),
        CacheError::InvalidByteBudget(0)
    );
}
