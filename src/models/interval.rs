use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar interval requested from the quote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1-minute bars (intraday snapshots)
    Minute,
    /// Daily bars
    Daily,
    /// Weekly bars (resampled from daily)
    Weekly,
}

impl Interval {
    /// Convert to VCI API format ("1m", "1D", "1W")
    pub fn to_vci_format(&self) -> &'static str {
        match self {
            Interval::Minute => "1m",
            Interval::Daily => "1D",
            Interval::Weekly => "1W",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_vci_format())
    }
}
