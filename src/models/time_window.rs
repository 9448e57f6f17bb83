use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::format_local_timestamp;

/// Half-open `[start, end)` span of market-local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Returns `None` unless `start < end`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Like `new`, but an `end` not after `start` is pushed to one minute past it
    pub fn clamped(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let end = if end > start { end } else { start + Duration::minutes(1) };
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Trading date the window belongs to
    pub fn date(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            format_local_timestamp(&self.start),
            format_local_timestamp(&self.end)
        )
    }
}

/// Widened date range handed to the quote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for FetchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 7)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_window_requires_start_before_end() {
        assert!(TimeWindow::new(at(9, 0), at(15, 0)).is_some());
        assert!(TimeWindow::new(at(9, 0), at(9, 0)).is_none());
        assert!(TimeWindow::new(at(15, 0), at(9, 0)).is_none());
        assert_eq!(TimeWindow::clamped(at(9, 0), at(9, 0)).end(), at(9, 1));
    }

    #[test]
    fn test_window_is_half_open() {
        let window = TimeWindow::new(at(9, 0), at(15, 0)).unwrap();
        assert!(window.contains(at(9, 0)));
        assert!(window.contains(at(14, 59)));
        assert!(!window.contains(at(15, 0)));
        assert!(!window.contains(at(8, 59)));
        assert_eq!(window.duration(), Duration::hours(6));
        assert_eq!(window.to_string(), "[2024-06-07 09:00:00, 2024-06-07 15:00:00)");
    }
}
