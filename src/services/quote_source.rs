//! Quote source abstraction
//!
//! Everything the snapshot and ranking services need from an upstream market
//! data provider. [`VciClient`](crate::services::vci::VciClient) is the
//! production implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error as ThisError;

use crate::models::{Interval, Ohlcv};

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum QuoteError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("No data available")]
    NoData,
}

impl From<serde_json::Error> for QuoteError {
    fn from(error: serde_json::Error) -> Self {
        QuoteError::Serialization(error.to_string())
    }
}

/// Reporting period for financial ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioPeriod {
    Quarter,
    Year,
}

impl RatioPeriod {
    pub fn to_vci_format(&self) -> &'static str {
        match self {
            RatioPeriod::Quarter => "Q",
            RatioPeriod::Year => "Y",
        }
    }
}

/// Latest financial ratios of a company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatio {
    pub market_cap: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub roe: Option<f64>,
    pub eps: Option<f64>,
    pub issue_share: Option<f64>,
}

/// Point-in-time price board figures for one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBoardEntry {
    /// Accumulated traded value of the current (or last) session
    pub traded_value: Option<f64>,
    pub match_price: Option<f64>,
    pub total_volume: Option<u64>,
}

/// Upstream market data provider
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// OHLCV bars for `symbol` between `start` and `end` (inclusive dates)
    ///
    /// Implementations must accept ranges wider than what the caller
    /// eventually keeps.
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<Ohlcv>, QuoteError>;

    /// Current price board figures, keyed by upper-case symbol
    async fn point_in_time(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, PriceBoardEntry>, QuoteError>;

    /// Members of an index or exchange group (e.g. "VN30", "HOSE")
    async fn symbols_by_group(&self, group_code: &str) -> Result<Vec<String>, QuoteError>;

    /// Latest financial ratios for one symbol
    async fn ratio(&self, symbol: &str, period: RatioPeriod) -> Result<FinancialRatio, QuoteError>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scriptable in-memory quote source with call counters

    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    pub struct MockQuoteSource {
        pub bars: Mutex<HashMap<String, Vec<Ohlcv>>>,
        pub history_error: Mutex<Option<QuoteError>>,
        pub groups: Mutex<HashMap<String, Vec<String>>>,
        pub market_caps: Mutex<HashMap<String, f64>>,
        pub traded_values: Mutex<HashMap<String, f64>>,
        pub failing_ratio: Mutex<HashSet<String>>,
        pub failing_board: Mutex<HashSet<String>>,
        pub delay: Option<Duration>,

        pub history_calls: AtomicUsize,
        pub board_calls: AtomicUsize,
        pub group_calls: AtomicUsize,
        pub ratio_calls: AtomicUsize,
        pub in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
    }

    impl MockQuoteSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn set_bars(&self, symbol: &str, bars: Vec<Ohlcv>) {
            self.bars.lock().unwrap().insert(symbol.to_string(), bars);
        }

        pub fn fail_history(&self, error: QuoteError) {
            *self.history_error.lock().unwrap() = Some(error);
        }

        pub fn set_group(&self, group: &str, symbols: &[&str]) {
            self.groups.lock().unwrap().insert(
                group.to_string(),
                symbols.iter().map(|s| s.to_string()).collect(),
            );
        }

        pub fn set_market_cap(&self, symbol: &str, cap: f64) {
            self.market_caps.lock().unwrap().insert(symbol.to_string(), cap);
        }

        pub fn set_traded_value(&self, symbol: &str, value: f64) {
            self.traded_values.lock().unwrap().insert(symbol.to_string(), value);
        }

        pub fn fail_ratio_for(&self, symbol: &str) {
            self.failing_ratio.lock().unwrap().insert(symbol.to_string());
        }

        pub fn fail_board_for(&self, symbol: &str) {
            self.failing_board.lock().unwrap().insert(symbol.to_string());
        }

        pub fn calls(counter: &AtomicUsize) -> usize {
            counter.load(Ordering::SeqCst)
        }

        async fn simulate_latency(&self) {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl QuoteSource for MockQuoteSource {
        async fn history(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
            _interval: Interval,
        ) -> Result<Vec<Ohlcv>, QuoteError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            if let Some(error) = self.history_error.lock().unwrap().clone() {
                return Err(error);
            }
            self.bars
                .lock()
                .unwrap()
                .get(symbol)
                .cloned()
                .ok_or(QuoteError::NoData)
        }

        async fn point_in_time(
            &self,
            symbols: &[String],
        ) -> Result<HashMap<String, PriceBoardEntry>, QuoteError> {
            self.board_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            let failing = self.failing_board.lock().unwrap().clone();
            if let Some(symbol) = symbols.iter().find(|s| failing.contains(*s)) {
                return Err(QuoteError::Http(format!("board request for {} timed out", symbol)));
            }

            let values = self.traded_values.lock().unwrap();
            Ok(symbols
                .iter()
                .filter_map(|s| {
                    values.get(s).map(|v| {
                        (
                            s.to_uppercase(),
                            PriceBoardEntry {
                                traded_value: Some(*v),
                                ..PriceBoardEntry::default()
                            },
                        )
                    })
                })
                .collect())
        }

        async fn symbols_by_group(&self, group_code: &str) -> Result<Vec<String>, QuoteError> {
            self.group_calls.fetch_add(1, Ordering::SeqCst);
            self.groups
                .lock()
                .unwrap()
                .get(group_code)
                .cloned()
                .ok_or(QuoteError::NoData)
        }

        async fn ratio(&self, symbol: &str, _period: RatioPeriod) -> Result<FinancialRatio, QuoteError> {
            self.ratio_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            if self.failing_ratio.lock().unwrap().contains(symbol) {
                return Err(QuoteError::InvalidResponse(format!("ratio for {} unavailable", symbol)));
            }
            Ok(FinancialRatio {
                market_cap: self.market_caps.lock().unwrap().get(symbol).copied(),
                ..FinancialRatio::default()
            })
        }
    }
}
