use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Basic OHLCV (Open, High, Low, Close, Volume) bar as returned by a quote source
///
/// `time` is market-local (Asia/Ho_Chi_Minh). Price fields may be NaN when
/// the upstream feed left a slot empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Bar timestamp, market-local
    pub time: NaiveDateTime,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Trading volume
    pub volume: u64,

    /// Optional ticker symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Ohlcv {
    /// Create a new OHLCV bar
    pub fn new(
        time: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            symbol: None,
        }
    }

    /// Create a new OHLCV bar with symbol
    pub fn with_symbol(
        time: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        symbol: String,
    ) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::new(time, open, high, low, close, volume)
        }
    }

    /// True when the close is a usable number
    pub fn has_numeric_close(&self) -> bool {
        self.close.is_finite()
    }
}
