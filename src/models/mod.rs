mod holiday;
mod index_series;
mod interval;
mod ohlcv;
mod ranking;
mod snapshot_config;
mod time_window;

pub use holiday::HolidaySet;
pub use index_series::{points_in_window, DataAvailability, DataOrigin, IndexPoint, IndexSeries};
pub use interval::Interval;
pub use ohlcv::Ohlcv;
pub use ranking::{
    GroupRanking, MarketCapRanking, SymbolAttribute, SymbolFailure, SymbolRanking,
};
pub use snapshot_config::SnapshotConfig;
pub use time_window::{FetchRange, TimeWindow};
