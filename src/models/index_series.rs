use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Ohlcv, TimeWindow};

/// One price sample of an index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexPoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

impl IndexPoint {
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        Self { time, value }
    }
}

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    /// Served from a cache without touching the quote source
    Cache,
    /// Fetched from the quote source for this request
    Upstream,
}

/// Whether upstream data could be obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataAvailability {
    Available,
    /// Upstream failed; callers render "N/A"
    Unavailable { reason: String },
}

impl DataAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, DataAvailability::Available)
    }
}

/// Index history for the current trading window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSeries {
    pub index_code: String,
    pub window: TimeWindow,
    pub points: Vec<IndexPoint>,
    pub availability: DataAvailability,
    pub origin: DataOrigin,
}

impl IndexSeries {
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }
}

/// Convert raw bars of `window` into index points
///
/// Drops bars outside the window or without a numeric close, keeps the last
/// bar seen for each timestamp and returns the points in ascending time order.
pub fn points_in_window(bars: &[Ohlcv], window: &TimeWindow) -> Vec<IndexPoint> {
    let mut by_time: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();

    for bar in bars {
        if !window.contains(bar.time) || !bar.has_numeric_close() {
            continue;
        }
        by_time.insert(bar.time, bar.close);
    }

    by_time
        .into_iter()
        .map(|(time, value)| IndexPoint::new(time, value))
        .collect()
}
