//! Configuration Module
//!
//! Handles loading cache and demo settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::size::{Overhead, DEFAULT_MAP_ENTRY_OVERHEAD};

/// Cache and demo driver configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on the estimated size of the cache contents
    pub limit_bytes: u64,
    /// Bytes of bucket slack assumed per map entry
    pub map_entry_overhead: f64,
    /// Number of inserts the demo performs, 0 = until interrupted
    pub demo_inserts: u64,
    /// Log the cache size every this many inserts
    pub report_every: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LIMIT_BYTES` - Cache byte limit (default: 100000)
    /// - `MAP_ENTRY_OVERHEAD` - Per-entry map overhead in bytes (default: 10.79)
    /// - `DEMO_INSERTS` - Demo insert count, 0 for unbounded (default: 0)
    /// - `REPORT_EVERY` - Demo progress interval (default: 1000)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            limit_bytes: var_or("LIMIT_BYTES", defaults.limit_bytes),
            map_entry_overhead: var_or("MAP_ENTRY_OVERHEAD", defaults.map_entry_overhead),
            demo_inserts: var_or("DEMO_INSERTS", defaults.demo_inserts),
            report_every: var_or("REPORT_EVERY", defaults.report_every).max(1),
        }
    }

    /// Returns the estimator overhead constants.
    pub fn overhead(&self) -> Overhead {
        Overhead {
            map_entry: self.map_entry_overhead,
        }
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit_bytes: 100_000,
            map_entry_overhead: DEFAULT_MAP_ENTRY_OVERHEAD,
            demo_inserts: 0,
            report_every: 1000,
        }
    }
}
