//! Cache Module
//!
//! Provides an in-memory key/value cache bounded by estimated memory size,
//! with FIFO eviction.

mod bounded;
mod fifo;
mod stats;
mod store;


// Re-export public types
pub use bounded::BoundedCache;
pub use fifo::FifoQueue;
pub use stats::CacheStats;
pub use store::CacheStore;
