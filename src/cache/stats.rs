//! Cache Statistics Module
//!
//! Tracks inserts, evictions and the last measured size of the cache.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity and size.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of completed `set` calls
    pub sets: u64,
    /// Number of entries removed by FIFO eviction
    pub evictions: u64,
    /// Sum of the individually estimated sizes of evicted values
    pub bytes_evicted: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Estimated size of the mapping at the last measurement
    pub estimated_bytes: u64,
    /// Configured byte limit
    pub limit_bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            limit_bytes,
            ..Self::default()
        }
    }

    // == Utilization ==
    /// Fraction of the byte limit in use at the last measurement.
    ///
    /// Returns 0.0 for a zero limit. Can exceed 1.0 when a single entry is
    /// larger than the limit.
    pub fn utilization(&self) -> f64 {
        if self.limit_bytes == 0 {
            0.0
        } else {
            self.estimated_bytes as f64 / self.limit_bytes as f64
        }
    }

    // == Record Set ==
    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    // == Record Eviction ==
    /// Counts one evicted entry of `bytes` estimated size.
    pub fn record_eviction(&mut self, bytes: u64) {
        self.evictions += 1;
        self.bytes_evicted += bytes;
    }

    // == Update Gauges ==
    /// Updates the entry count and the measured size.
    pub fn set_gauges(&mut self, total_entries: usize, estimated_bytes: u64) {
        self.total_entries = total_entries;
        self.estimated_bytes = estimated_bytes;
    }
}
