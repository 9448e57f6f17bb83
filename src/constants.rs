//! Market and cache constants
//!
//! Defaults for the trading session, window resolution, caches and the
//! per-symbol fan-out. Every value here can be overridden through
//! [`SnapshotConfig`](crate::models::SnapshotConfig) except the session hours,
//! which live in [`TradingHours`](crate::services::trading_calendar::TradingHours).

/// Market timezone for the Vietnam stock exchanges (HOSE, HNX, UPCOM)
pub const MARKET_TIMEZONE: &str = "Asia/Ho_Chi_Minh";

/// Session open hour (09:00 local)
pub const MARKET_OPEN_HOUR: u32 = 9;

/// Session close hour (15:00 local)
pub const MARKET_CLOSE_HOUR: u32 = 15;

/// Minutes before the open at which a growing intraday window starts (08:59)
pub const INTRADAY_LEAD_MINUTES: i64 = 1;

/// Maximum number of days `previous_trading_day` walks backwards
pub const PREVIOUS_TRADING_DAY_LOOKBACK: u32 = 10;

/// Calendar days subtracted from the window start when fetching from the quote source
pub const DEFAULT_FETCH_LOOKBACK_DAYS: i64 = 10;

/// Minimum delay between holiday file reloads after a failed or empty load
pub const HOLIDAY_RELOAD_BACKOFF_SECONDS: u64 = 60;

/// In-memory snapshot cache TTL (10 minutes)
pub const SHORT_CACHE_TTL_SECONDS: i64 = 600;

/// Upper bound on in-memory snapshot cache entries before eviction kicks in
pub const SHORT_CACHE_MAX_ENTRIES: usize = 1024;

/// On-disk ranking cache TTL
pub const DISK_CACHE_TTL_DAYS: i64 = 90;

/// Concurrent per-symbol requests during a group ranking fan-out
pub const WORKER_POOL_SIZE: usize = 10;

/// Number of symbols kept in a group ranking (treemap view)
pub const DEFAULT_TOP_N: usize = 35;

/// Default VCI request budget per minute
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Index tickers served by the snapshot service
pub const INDEX_TICKERS: &[&str] = &["VNINDEX", "VN30", "HNXINDEX", "UPCOMINDEX"];
