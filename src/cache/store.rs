//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with FIFO tracking and
//! size-bounded eviction.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::cache::{CacheStats, FifoQueue};
use crate::error::Result;
use crate::size::{estimate_size_with, DeepSize, Overhead};

/// Running totals of one eviction loop.
#[derive(Debug, Default)]
struct EvictionPass {
    /// Last measured size of the mapping
    size: u64,
    /// Bytes evicted so far
    bytes: u64,
    /// Entries evicted so far
    entries: usize,
}

// == Cache Store ==
/// Unsynchronized cache storage bounded by estimated memory size.
///
/// See [`BoundedCache`](crate::cache::BoundedCache) for the thread-safe wrapper.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, T>,
    /// Insertion order tracker
    order: FifoQueue,
    /// Upper bound on the estimated size of `entries`
    limit_bytes: u64,
    /// Corrections used for every size estimate
    overhead: Overhead,
    /// Activity statistics
    stats: CacheStats,
}

impl<T: DeepSize> CacheStore<T> {
    // == Constructor ==
    /// Creates a new CacheStore limited to `limit_bytes` estimated bytes.
    ///
    /// Fails if a default `T` cannot be sized, so unsupported value types are
    /// caught before anything is inserted.
    pub fn new(limit_bytes: u64) -> Result<Self>
    where
        T: Default,
    {
        Self::with_overhead(limit_bytes, Overhead::default())
    }

    /// Creates a new CacheStore with explicit overhead constants.
    pub fn with_overhead(limit_bytes: u64, overhead: Overhead) -> Result<Self>
    where
        T: Default,
    {
        let default_estimate = estimate_size_with(&T::default(), overhead)?;
        debug!(
            "Cache store created: limit_bytes={}, default value estimate={}",
            limit_bytes, default_estimate
        );

        let entries: HashMap<String, T> = HashMap::new();
        let mut stats = CacheStats::new(limit_bytes);
        stats.set_gauges(0, estimate_size_with(&entries, overhead)?);

        Ok(Self {
            entries,
            order: FifoQueue::new(),
            limit_bytes,
            overhead,
            stats,
        })
    }

    // == Set ==
    /// Stores a value, then evicts the oldest entries while the estimated
    /// size of the cache exceeds the limit.
    ///
    /// Returns the sum of the individually estimated sizes of the evicted
    /// values. A lone entry whose own estimate exceeds the limit is kept;
    /// any other entry, including the one just written, may be evicted.
    ///
    /// A value whose dynamic content cannot be sized is rejected before the
    /// cache is modified. If a stored value fails to size during measurement,
    /// the new entry and any evictions already made stay in place, the stats
    /// reflect them, and the error is returned.
    pub fn set(&mut self, key: String, value: T) -> Result<u64> {
        estimate_size_with(&value, self.overhead)?;

        self.order.push(&key);
        self.entries.insert(key, value);
        self.stats.record_set();

        let mut pass = EvictionPass {
            size: self.stats.estimated_bytes,
            ..EvictionPass::default()
        };
        let outcome = self.evict_to_fit(&mut pass);
        self.stats.set_gauges(self.entries.len(), pass.size);
        outcome?;

        if pass.entries > 0 {
            debug!(
                "Evicted {} entries ({} bytes) to fit limit of {} bytes",
                pass.entries, pass.bytes, self.limit_bytes
            );
        }
        if pass.size > self.limit_bytes {
            warn!(
                "Cache holds {} bytes over a {} byte limit with {} entries left",
                pass.size,
                self.limit_bytes,
                self.entries.len()
            );
        }

        Ok(pass.bytes)
    }

    /// Measures the mapping and removes the oldest entries until it fits.
    fn evict_to_fit(&mut self, pass: &mut EvictionPass) -> Result<()> {
        pass.size = self.estimated_size()?;

        while pass.size > self.limit_bytes {
            let Some(oldest) = self.order.peek_oldest().cloned() else {
                break;
            };
            let bytes = match self.entries.get(&oldest) {
                Some(value) => estimate_size_with(value, self.overhead)?,
                None => 0,
            };
            if self.order.len() == 1 && bytes > self.limit_bytes {
                break;
            }

            self.order.pop_oldest();
            if self.entries.remove(&oldest).is_some() {
                self.stats.record_eviction(bytes);
                pass.bytes += bytes;
                pass.entries += 1;
                trace!("Evicted key={} bytes={}", oldest, bytes);
            }
            pass.size = self.estimated_size()?;
        }
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the value for `key`, or `T::default()` if absent.
    pub fn get(&self, key: &str) -> T
    where
        T: Clone + Default,
    {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    // == Estimated Size ==
    /// Measures the estimated size of the whole mapping.
    pub fn estimated_size(&self) -> Result<u64> {
        Ok(estimate_size_with(&self.entries, self.overhead)?)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }
}

impl<T> CacheStore<T> {
    /// Returns the configured byte limit.
    pub fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    /// Returns the overhead constants used for estimates.
    pub fn overhead(&self) -> Overhead {
        self.overhead
    }

    /// Checks whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the keys from oldest to newest insertion.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::error::CacheError;
    use crate::size::{estimate_size, DeepSize};

    /// Estimated size of a store holding `keys` mapped to `u64` values.
    fn map_size(keys: &[&str]) -> u64 {
        let map: HashMap<String, u64> = keys.iter().map(|k| (k.to_string(), 0)).collect();
        estimate_size(&map).unwrap()
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<u64> = CacheStore::new(1000).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.limit_bytes(), 1000);
        assert_eq!(store.overhead(), Overhead::default());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(10_000).unwrap();

        let evicted = store.set("key1".to_string(), 7u64).unwrap();

        assert_eq!(evicted, 0);
        assert_eq!(store.get("key1"), 7);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing_returns_default() {
        let store: CacheStore<String> = CacheStore::new(10_000).unwrap();
        assert_eq!(store.get("nonexistent"), String::new());
    }

    #[test]
    fn test_store_get_is_idempotent() {
        let mut store = CacheStore::new(10_000).unwrap();
        store.set("key1".to_string(), vec![1u8, 2, 3]).unwrap();

        assert_eq!(store.get("key1"), store.get("key1"));
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(10_000).unwrap();

        store.set("key1".to_string(), 1u64).unwrap();
        store.set("key1".to_string(), 2u64).unwrap();

        assert_eq!(store.get("key1"), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.keys(), vec!["key1".to_string()]);
    }

    #[test]
    fn test_store_evicts_oldest_first() {
        let limit = map_size(&["k1", "k2", "k3"]);
        let mut store = CacheStore::new(limit).unwrap();

        store.set("k1".to_string(), 1u64).unwrap();
        store.set("k2".to_string(), 2u64).unwrap();
        store.set("k3".to_string(), 3u64).unwrap();
        assert_eq!(store.len(), 3);

        let evicted = store.set("k4".to_string(), 4u64).unwrap();

        assert_eq!(evicted, 8);
        assert_eq!(store.keys(), vec!["k2", "k3", "k4"]);
        assert!(!store.contains_key("k1"));
        assert_eq!(store.get("k1"), 0);
        assert!(store.estimated_size().unwrap() <= limit);
    }

    #[test]
    fn test_store_reinsert_refreshes_position() {
        let limit = map_size(&["k1", "k2", "k3"]);
        let mut store = CacheStore::new(limit).unwrap();

        store.set("k1".to_string(), 1u64).unwrap();
        store.set("k2".to_string(), 2u64).unwrap();
        store.set("k3".to_string(), 3u64).unwrap();
        store.set("k1".to_string(), 10u64).unwrap();

        store.set("k4".to_string(), 4u64).unwrap();

        // k2 is the oldest insertion once k1 was written again
        assert_eq!(store.keys(), vec!["k3", "k1", "k4"]);
        assert_eq!(store.get("k1"), 10);
    }

    #[test]
    fn test_store_evicts_several_for_large_value() {
        let limit = 400;
        let mut store: CacheStore<String> = CacheStore::new(limit).unwrap();

        store.set("a".to_string(), "x".repeat(40)).unwrap();
        store.set("b".to_string(), "x".repeat(40)).unwrap();
        store.set("c".to_string(), "x".repeat(40)).unwrap();

        let evicted = store.set("d".to_string(), "y".repeat(200)).unwrap();

        let one = estimate_size(&"x".repeat(40)).unwrap();
        assert_eq!(evicted % one, 0);
        assert!(evicted >= 2 * one);
        assert!(store.contains_key("d"));
        assert!(store.estimated_size().unwrap() <= limit);
    }

    #[test]
    fn test_store_single_oversized_entry_is_kept() {
        let mut store: CacheStore<String> = CacheStore::new(100).unwrap();

        store.set("small".to_string(), "s".to_string()).unwrap();
        let evicted = store.set("huge".to_string(), "h".repeat(500)).unwrap();

        assert_eq!(evicted, estimate_size(&"s".to_string()).unwrap());
        assert_eq!(store.keys(), vec!["huge"]);
        assert!(store.estimated_size().unwrap() > 100);
    }

    #[test]
    fn test_store_evicts_lone_entry_that_fits_limit() {
        let header = estimate_size(&HashMap::<String, u8>::new()).unwrap();
        let limit = header + 12;
        let mut store: CacheStore<u8> = CacheStore::new(limit).unwrap();

        // One u8 fits the limit, but with its key and slot the map does not.
        let evicted = store.set("k".to_string(), 1).unwrap();

        assert_eq!(evicted, 1);
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
        assert_eq!(store.estimated_size().unwrap(), header);
        assert_eq!(store.stats().estimated_bytes, header);
    }

    #[test]
    fn test_store_unsizable_content_updates_stats() {
        type Slot = Rc<RefCell<Option<Box<dyn DeepSize>>>>;

        let mut store: CacheStore<Slot> = CacheStore::new(10_000).unwrap();
        let content: Box<dyn DeepSize> = Box::new(String::from("ok"));
        let slot: Slot = Rc::new(RefCell::new(Some(content)));
        store.set("a".to_string(), Rc::clone(&slot)).unwrap();
        let measured = store.stats().estimated_bytes;

        let closure: Box<dyn Fn()> = Box::new(|| {});
        let poisoned: Box<dyn DeepSize> = Box::new(closure);
        *slot.borrow_mut() = Some(poisoned);
        let result = store.set("b".to_string(), Slot::default());

        assert!(matches!(result, Err(CacheError::Unsupported(_))));
        let stats = store.stats();
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.estimated_bytes, measured);
        assert_eq!(store.keys(), vec!["a", "b"]);

        *slot.borrow_mut() = None;
        store.set("c".to_string(), Slot::default()).unwrap();
        assert_eq!(
            store.stats().estimated_bytes,
            store.estimated_size().unwrap()
        );
    }

    #[test]
    fn test_store_stats() {
        let limit = map_size(&["k1", "k2"]);
        let mut store = CacheStore::new(limit).unwrap();

        store.set("k1".to_string(), 1u64).unwrap();
        store.set("k2".to_string(), 2u64).unwrap();
        store.set("k3".to_string(), 3u64).unwrap();

        let stats = store.stats();
        assert_eq!(stats.sets, 3);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.bytes_evicted, 8);
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.estimated_bytes, store.estimated_size().unwrap());
        assert_eq!(stats.limit_bytes, limit);
    }

    #[test]
    fn test_store_rejects_unsizable_value_type() {
        struct Callback(Box<dyn Fn(u32)>);

        impl Default for Callback {
            fn default() -> Self {
                Callback(Box::new(|_| {}))
            }
        }

        crate::deep_size_record!(Callback { 0 });

        let result = CacheStore::<Callback>::new(1000);
        assert!(matches!(result, Err(CacheError::Unsupported(_))));
    }

    #[test]
    fn test_store_rejects_unsizable_dynamic_value() {
        type Dynamic = Option<Box<dyn DeepSize>>;

        let mut store: CacheStore<Dynamic> = CacheStore::new(10_000).unwrap();
        store.set("ok".to_string(), Some(Box::new(5u32))).unwrap();

        let closure: Box<dyn Fn()> = Box::new(|| {});
        let result = store.set("bad".to_string(), Some(Box::new(closure)));

        assert!(matches!(result, Err(CacheError::Unsupported(_))));
        assert_eq!(store.keys(), vec!["ok"]);
        assert_eq!(store.stats().sets, 1);
    }
}
