pub mod clock;
pub mod disk_cache;
pub mod group_ranking;
pub mod market_index;
pub mod quote_source;
pub mod ranker;
pub mod short_term_cache;
pub mod trading_calendar;
pub mod value_aggregator;
pub mod vci;
pub mod window_resolver;
pub mod worker_pool;

pub use clock::{Clock, ManualClock, SystemClock};
pub use disk_cache::{CachedRanking, DiskCache};
pub use group_ranking::GroupRankingService;
pub use market_index::{MarketIndexService, SnapshotCache};
pub use quote_source::{FinancialRatio, PriceBoardEntry, QuoteError, QuoteSource, RatioPeriod};
pub use ranker::{ConcurrentRanker, RankOutcome};
pub use short_term_cache::{window_cache_key, CacheEntry, ShortTermCache};
pub use trading_calendar::{HolidayStatus, TradingCalendar, TradingHours};
pub use value_aggregator::{AggregateOutcome, ValueAggregator};
pub use vci::{SharedRateLimiter, VciClient};
pub use window_resolver::{ResolvedWindow, SessionPhase, TradingWindowResolver};
pub use worker_pool::{FanOutReport, WorkerPool};
