//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::Capacity;
use crate::error::{CacheError, Result};

/// Which limit the cache enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Bounded by entry count
    Count,
    /// Bounded by summed value bytes
    Bytes,
}

impl FromStr for CacheMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(CacheMode::Count),
            "bytes" | "byte" => Ok(CacheMode::Bytes),
            other => Err(CacheError::InvalidCommand(format!(
                "unknown cache mode '{}'",
                other
            ))),
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Limit enforced by the cache
    pub mode: CacheMode,
    /// Entry capacity for count mode; -1 means unbounded
    pub capacity: i64,
    /// Byte budget for bytes mode
    pub byte_budget: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_MODE` - `count` or `bytes` (default: count)
    /// - `LRU_CAPACITY` - Entry capacity, -1 for unbounded (default: 1000)
    /// - `LRU_BYTE_BUDGET` - Byte budget (default: 1048576)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mode: env::var("LRU_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mode),
            capacity: env::var("LRU_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            byte_budget: env::var("LRU_BYTE_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.byte_budget),
        }
    }

    /// Validated entry capacity.
    pub fn entry_capacity(&self) -> Result<Capacity> {
        Capacity::try_from(self.capacity)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: CacheMode::Count,
            capacity: 1000,
            byte_budget: 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.mode, CacheMode::Count);
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.byte_budget, 1024 * 1024);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("LRU_MODE");
        env::remove_var("LRU_CAPACITY");
        env::remove_var("LRU_BYTE_BUDGET");

        let config = Config::from_env();
        assert_eq!(config.mode, CacheMode::Count);
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.byte_budget, 1024 * 1024);
    }

    #[test]
    fn test_cache_mode_parse() {
        assert_eq!("count".parse::<CacheMode>(), Ok(CacheMode::Count));
        assert_eq!(" Bytes ".parse::<CacheMode>(), Ok(CacheMode::Bytes));
        assert!("lfu".parse::<CacheMode>().is_err());
    }

    #[test]
    fn test_entry_capacity() {
        let mut config = Config::default();
        assert_eq!(config.entry_capacity(), Ok(Capacity::Bounded(1000)));

        config.capacity = -1;
        assert_eq!(config.entry_capacity(), Ok(Capacity::Unbounded));

        config.capacity = 1;
        assert!(config.entry_capacity().is_err());
    }
}
