//! Bounded Cache Module
//!
//! Thread-safe wrapper around [`CacheStore`].

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;
use crate::size::{DeepSize, Overhead};

// == Bounded Cache ==
/// FIFO cache bounded by the estimated memory size of its contents.
///
/// Every operation holds a single cache-wide lock for its full duration,
/// including the eviction loop inside [`set`](Self::set). Share it across
/// threads with an `Arc`.
#[derive(Debug)]
pub struct BoundedCache<T> {
    store: Mutex<CacheStore<T>>,
}

impl<T: DeepSize> BoundedCache<T> {
    // == Constructor ==
    /// Creates a cache limited to `limit_bytes` estimated bytes.
    ///
    /// Fails with [`CacheError::Unsupported`](crate::CacheError::Unsupported)
    /// if `T` cannot be sized.
    pub fn new(limit_bytes: u64) -> Result<Self>
    where
        T: Default,
    {
        Ok(Self {
            store: Mutex::new(CacheStore::new(limit_bytes)?),
        })
    }

    /// Creates a cache with explicit overhead constants.
    pub fn with_overhead(limit_bytes: u64, overhead: Overhead) -> Result<Self>
    where
        T: Default,
    {
        Ok(Self {
            store: Mutex::new(CacheStore::with_overhead(limit_bytes, overhead)?),
        })
    }

    // == Set ==
    /// Inserts or overwrites `key`, evicting the oldest entries as needed.
    ///
    /// Returns the estimated bytes reclaimed by eviction.
    pub fn set(&self, key: impl Into<String>, value: T) -> Result<u64> {
        self.store.lock().set(key.into(), value)
    }

    // == Get ==
    /// Returns the value for `key`, or `T::default()` if absent.
    pub fn get(&self, key: &str) -> T
    where
        T: Clone + Default,
    {
        self.store.lock().get(key)
    }

    /// Measures the estimated size of all entries.
    pub fn estimated_size(&self) -> Result<u64> {
        self.store.lock().estimated_size()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }
}

impl<T> BoundedCache<T> {
    pub fn limit_bytes(&self) -> u64 {
        self.store.lock().limit_bytes()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().contains_key(key)
    }

    /// Returns the keys from oldest to newest insertion.
    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}
