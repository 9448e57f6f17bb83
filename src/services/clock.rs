use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::sync::Mutex;

/// Source of "now" for window resolution and cache ages
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Wall-clock time in the market timezone
    fn market_now(&self) -> NaiveDateTime;
}

/// Real clock for the Vietnam market
#[derive(Debug, Clone)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Ho_Chi_Minh)
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn market_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// Settable clock for tests and replays
///
/// Holds market-local time; UTC is derived with the market's fixed +07:00
/// offset (Vietnam has no DST).
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    const MARKET_OFFSET_HOURS: i64 = 7;

    pub fn new(market_now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(market_now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let local = self.market_now();
        (local - chrono::Duration::hours(Self::MARKET_OFFSET_HOURS)).and_utc()
    }

    fn market_now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
