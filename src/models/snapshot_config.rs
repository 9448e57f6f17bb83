use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_FETCH_LOOKBACK_DAYS, DEFAULT_RATE_LIMIT_PER_MINUTE, DEFAULT_TOP_N,
    DISK_CACHE_TTL_DAYS, SHORT_CACHE_MAX_ENTRIES, SHORT_CACHE_TTL_SECONDS, WORKER_POOL_SIZE,
};
use crate::error::{Error, Result};
use crate::utils::{get_holidays_path, get_ranking_cache_dir};

/// Tunables for the snapshot and ranking services
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Holiday calendar JSON file
    pub holidays_path: PathBuf,

    /// Directory holding one ranking cache file per group
    pub ranking_cache_dir: PathBuf,

    /// Calendar days fetched before the window start to cover feed gaps
    pub fetch_lookback_days: i64,

    /// In-memory snapshot cache TTL
    pub short_cache_ttl_secs: i64,

    /// In-memory snapshot cache capacity
    pub short_cache_max_entries: usize,

    /// On-disk ranking cache TTL
    pub disk_cache_ttl_days: i64,

    /// Concurrent per-symbol requests per fan-out
    pub worker_pool_size: usize,

    /// Symbols kept per group ranking
    pub top_n: usize,

    /// VCI request budget per minute
    pub rate_limit_per_minute: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            holidays_path: PathBuf::from("holidays.json"),
            ranking_cache_dir: PathBuf::from("cache").join("treemap"),
            fetch_lookback_days: DEFAULT_FETCH_LOOKBACK_DAYS,
            short_cache_ttl_secs: SHORT_CACHE_TTL_SECONDS,
            short_cache_max_entries: SHORT_CACHE_MAX_ENTRIES,
            disk_cache_ttl_days: DISK_CACHE_TTL_DAYS,
            worker_pool_size: WORKER_POOL_SIZE,
            top_n: DEFAULT_TOP_N,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl SnapshotConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let config = Self {
            holidays_path: get_holidays_path(),
            ranking_cache_dir: get_ranking_cache_dir(),
            fetch_lookback_days: env_or("FETCH_LOOKBACK_DAYS", DEFAULT_FETCH_LOOKBACK_DAYS)?,
            short_cache_ttl_secs: env_or("SHORT_CACHE_TTL_SECS", SHORT_CACHE_TTL_SECONDS)?,
            short_cache_max_entries: env_or("SHORT_CACHE_MAX_ENTRIES", SHORT_CACHE_MAX_ENTRIES)?,
            disk_cache_ttl_days: env_or("DISK_CACHE_TTL_DAYS", DISK_CACHE_TTL_DAYS)?,
            worker_pool_size: env_or("WORKER_POOL_SIZE", WORKER_POOL_SIZE)?,
            top_n: env_or("TREEMAP_TOP_N", DEFAULT_TOP_N)?,
            rate_limit_per_minute: env_or("VCI_RATE_LIMIT", DEFAULT_RATE_LIMIT_PER_MINUTE)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the services misbehave
    pub fn validate(&self) -> Result<()> {
        if self.fetch_lookback_days < 0 {
            return Err(Error::Config("FETCH_LOOKBACK_DAYS must not be negative".to_string()));
        }
        if self.short_cache_ttl_secs <= 0 {
            return Err(Error::Config("SHORT_CACHE_TTL_SECS must be positive".to_string()));
        }
        if self.short_cache_max_entries == 0 {
            return Err(Error::Config("SHORT_CACHE_MAX_ENTRIES must be positive".to_string()));
        }
        if self.disk_cache_ttl_days <= 0 {
            return Err(Error::Config("DISK_CACHE_TTL_DAYS must be positive".to_string()));
        }
        if self.worker_pool_size == 0 {
            return Err(Error::Config("WORKER_POOL_SIZE must be at least 1".to_string()));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(Error::Config("VCI_RATE_LIMIT must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", key, value, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnapshotConfig::default();
        assert_eq!(config.fetch_lookback_days, 10);
        assert_eq!(config.short_cache_ttl_secs, 600);
        assert_eq!(config.disk_cache_ttl_days, 90);
        assert_eq!(config.worker_pool_size, 10);
        assert_eq!(config.top_n, 35);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let config = SnapshotConfig {
            worker_pool_size: 0,
            ..SnapshotConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_or_parses_and_falls_back() {
        std::env::set_var("MARKET_SNAPSHOT_TEST_POOL", "4");
        assert_eq!(env_or("MARKET_SNAPSHOT_TEST_POOL", 10usize).unwrap(), 4);
        std::env::set_var("MARKET_SNAPSHOT_TEST_POOL", "many");
        assert!(env_or("MARKET_SNAPSHOT_TEST_POOL", 10usize).is_err());
        std::env::remove_var("MARKET_SNAPSHOT_TEST_POOL");
        assert_eq!(env_or("MARKET_SNAPSHOT_TEST_POOL", 10usize).unwrap(), 10);
    }
}
