use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::constants::DEFAULT_FETCH_LOOKBACK_DAYS;
use crate::models::{points_in_window, FetchRange, IndexPoint, Ohlcv, TimeWindow};
use crate::services::trading_calendar::{TradingCalendar, TradingHours};

/// Which branch produced a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Weekend or holiday: previous trading day's full session
    NonTradingDay,
    /// Before the open: previous trading day's full session
    PreOpen,
    /// Session in progress: growing window ending at `now`
    Intraday,
    /// After the close: today's full session
    PostClose,
}

/// A window together with the range to request from the quote source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub window: TimeWindow,
    pub fetch_range: FetchRange,
    pub phase: SessionPhase,
}

impl ResolvedWindow {
    /// Keep only the bars inside the precise window
    pub fn filter(&self, bars: &[Ohlcv]) -> Vec<IndexPoint> {
        points_in_window(bars, &self.window)
    }
}

/// Maps "now" to the most recent complete or in-progress trading session
#[derive(Debug, Clone)]
pub struct TradingWindowResolver {
    calendar: Arc<TradingCalendar>,
    hours: TradingHours,
    fetch_lookback_days: i64,
}

impl TradingWindowResolver {
    pub fn new(calendar: Arc<TradingCalendar>) -> Self {
        Self {
            calendar,
            hours: TradingHours::default(),
            fetch_lookback_days: DEFAULT_FETCH_LOOKBACK_DAYS,
        }
    }

    pub fn with_fetch_lookback_days(mut self, days: i64) -> Self {
        self.fetch_lookback_days = days.max(0);
        self
    }

    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    /// Resolve the authoritative window for market-local `now`
    pub fn resolve(&self, now: NaiveDateTime) -> ResolvedWindow {
        let today = now.date();
        let market_open = self.hours.open_at(today);
        let market_close = self.hours.close_at(today);

        let (window, phase) = if self.calendar.is_weekend(today) || self.calendar.is_holiday(today) {
            (self.previous_session(today), SessionPhase::NonTradingDay)
        } else if market_open <= now && now <= market_close {
            let start = self.hours.intraday_start_at(today);
            // now >= open > intraday start, so the window is never empty
            (TimeWindow::clamped(start, now), SessionPhase::Intraday)
        } else if now > market_close {
            (self.full_session(today), SessionPhase::PostClose)
        } else {
            (self.previous_session(today), SessionPhase::PreOpen)
        };

        let fetch_range = FetchRange {
            start: window.start().date() - Duration::days(self.fetch_lookback_days),
            end: now.date(),
        };

        tracing::debug!(
            now = %now,
            window = %window,
            fetch_range = %fetch_range,
            phase = ?phase,
            "Resolved trading window"
        );

        ResolvedWindow {
            window,
            fetch_range,
            phase,
        }
    }

    fn previous_session(&self, today: NaiveDate) -> TimeWindow {
        self.full_session(self.calendar.previous_trading_day(today))
    }

    fn full_session(&self, date: NaiveDate) -> TimeWindow {
        TimeWindow::clamped(self.hours.open_at(date), self.hours.close_at(date))
    }
}
