//! Maxbytes Cache - A memory-bounded key/value cache
//!
//! Values are sized with a cycle-aware deep size estimator; the oldest
//! entries are evicted whenever the estimate exceeds a byte limit.

pub mod cache;
pub mod config;
pub mod error;
pub mod size;

pub use cache::{BoundedCache, CacheStats, CacheStore};
pub use config::Config;
pub use error::{CacheError, Kind, Result, SizeError};
pub use size::{
    estimate_size, estimate_size_with, must_estimate_size, Context, DeepSize, Overhead,
    DEFAULT_MAP_ENTRY_OVERHEAD,
};
