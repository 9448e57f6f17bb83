use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration as StdDuration, Instant};

use crate::constants::{
    HOLIDAY_RELOAD_BACKOFF_SECONDS, INTRADAY_LEAD_MINUTES, MARKET_CLOSE_HOUR, MARKET_OPEN_HOUR,
    MARKET_TIMEZONE, PREVIOUS_TRADING_DAY_LOOKBACK,
};
use crate::models::HolidaySet;

/// Trading hours configuration for Vietnam stock market
#[derive(Debug, Clone)]
pub struct TradingHours {
    pub open_hour: u32,              // 9 for 9am
    pub close_hour: u32,             // 15 for 3pm
    pub intraday_lead_minutes: i64,  // intraday windows start at 08:59
    pub timezone: &'static str,      // "Asia/Ho_Chi_Minh"
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            open_hour: MARKET_OPEN_HOUR,
            close_hour: MARKET_CLOSE_HOUR,
            intraday_lead_minutes: INTRADAY_LEAD_MINUTES,
            timezone: MARKET_TIMEZONE,
        }
    }
}

impl TradingHours {
    /// Session open on `date`
    pub fn open_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(hour(self.open_hour))
    }

    /// Session close on `date`
    pub fn close_at(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(hour(self.close_hour))
    }

    /// Start of the growing intraday window on `date`
    pub fn intraday_start_at(&self, date: NaiveDate) -> NaiveDateTime {
        self.open_at(date) - Duration::minutes(self.intraday_lead_minutes)
    }

    /// Minutes from the intraday start to the close
    pub fn session_minutes(&self) -> i64 {
        i64::from(self.close_hour) * 60 - i64::from(self.open_hour) * 60 + self.intraday_lead_minutes
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h.min(23), 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Result of a holiday lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayStatus {
    /// Listed holiday
    Holiday,
    /// Year is covered and the date is not listed
    TradingDay,
    /// Year is missing from the holiday set; treated as a trading day
    Unknown,
}

#[derive(Debug, Clone)]
enum HolidaySource {
    File(PathBuf),
    Preloaded,
}

/// Weekend and public-holiday calendar
///
/// The holiday set is loaded from disk on first use and reloaded while it is
/// empty, at most once per backoff period. One calendar is shared by every
/// service in the process.
#[derive(Debug)]
pub struct TradingCalendar {
    source: HolidaySource,
    holidays: RwLock<Arc<HolidaySet>>,
    failed_load_at: Mutex<Option<Instant>>,
    reload_backoff: StdDuration,
    warned_years: Mutex<HashSet<i32>>,
}

impl TradingCalendar {
    /// Calendar backed by a holiday JSON file, loaded lazily
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(HolidaySource::File(path.into()), HolidaySet::new())
    }

    /// Calendar with an in-memory holiday set
    pub fn with_holidays(holidays: HolidaySet) -> Self {
        Self::new(HolidaySource::Preloaded, holidays)
    }

    fn new(source: HolidaySource, holidays: HolidaySet) -> Self {
        Self {
            source,
            holidays: RwLock::new(Arc::new(holidays)),
            failed_load_at: Mutex::new(None),
            reload_backoff: StdDuration::from_secs(HOLIDAY_RELOAD_BACKOFF_SECONDS),
            warned_years: Mutex::new(HashSet::new()),
        }
    }

    fn holidays(&self) -> Arc<HolidaySet> {
        let current = self
            .holidays
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        if !current.is_empty() {
            return current;
        }

        let HolidaySource::File(path) = &self.source else {
            return current;
        };

        let mut failed_load_at = self.failed_load_at.lock().unwrap_or_else(|e| e.into_inner());
        if failed_load_at.is_some_and(|at| at.elapsed() < self.reload_backoff) {
            return current;
        }

        match HolidaySet::from_file(path) {
            Ok(loaded) if loaded.is_empty() => {
                tracing::warn!(path = %path.display(), "Holiday calendar is empty");
                *failed_load_at = Some(Instant::now());
                current
            }
            Ok(loaded) => {
                tracing::info!(path = %path.display(), years = ?loaded.years(), "Loaded holiday calendar");
                let loaded = Arc::new(loaded);
                let mut guard = self.holidays.write().unwrap_or_else(|e| e.into_inner());
                *guard = loaded.clone();
                *failed_load_at = None;
                loaded
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load holiday calendar");
                *failed_load_at = Some(Instant::now());
                current
            }
        }
    }

    /// Holiday lookup that tells "not a holiday" apart from "year not covered"
    pub fn holiday_status(&self, date: NaiveDate) -> HolidayStatus {
        match self.holidays().year(date.year()) {
            Some(days) if days.contains(&date) => HolidayStatus::Holiday,
            Some(_) => HolidayStatus::TradingDay,
            None => HolidayStatus::Unknown,
        }
    }

    /// True for listed holidays; unknown years fail open and return false
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        match self.holiday_status(date) {
            HolidayStatus::Holiday => true,
            HolidayStatus::TradingDay => false,
            HolidayStatus::Unknown => {
                if self.first_warning_for(date.year()) {
                    tracing::warn!(year = date.year(), date = %date, "No holiday data for year, assuming trading day");
                }
                false
            }
        }
    }

    /// True the first time an uncovered `year` is reported
    fn first_warning_for(&self, year: i32) -> bool {
        self.warned_years
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(year)
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Most recent trading day strictly before `date`
    ///
    /// Walks back at most ten days. If none of them trades, the tenth day
    /// back is returned as-is.
    pub fn previous_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut candidate = date;
        for _ in 0..PREVIOUS_TRADING_DAY_LOOKBACK {
            candidate = candidate.pred_opt().unwrap_or(candidate);
            if self.is_trading_day(candidate) {
                return candidate;
            }
        }

        tracing::warn!(
            from = %date,
            returned = %candidate,
            lookback_days = PREVIOUS_TRADING_DAY_LOOKBACK,
            "No trading day found within lookback, returning last candidate"
        );
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar_2024(holidays: &[NaiveDate]) -> TradingCalendar {
        let mut set = HolidaySet::from_dates(holidays.iter().copied());
        set.insert_year(2024);
        TradingCalendar::with_holidays(set)
    }

    #[test]
    fn test_trading_hours_config() {
        let config = TradingHours::default();
        assert_eq!(config.open_hour, 9);
        assert_eq!(config.close_hour, 15);
        assert_eq!(config.timezone, "Asia/Ho_Chi_Minh");
        assert_eq!(
            config.intraday_start_at(date(2024, 6, 7)),
            date(2024, 6, 7).and_hms_opt(8, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_weekend_detection() {
        let calendar = calendar_2024(&[]);
        assert!(calendar.is_weekend(date(2024, 6, 8))); // Saturday
        assert!(calendar.is_weekend(date(2024, 6, 9))); // Sunday
        assert!(!calendar.is_weekend(date(2024, 6, 10))); // Monday
    }

    #[test]
    fn test_holiday_status() {
        let calendar = calendar_2024(&[date(2024, 4, 30)]);
        assert_eq!(calendar.holiday_status(date(2024, 4, 30)), HolidayStatus::Holiday);
        assert_eq!(calendar.holiday_status(date(2024, 4, 29)), HolidayStatus::TradingDay);
        assert_eq!(calendar.holiday_status(date(2031, 4, 30)), HolidayStatus::Unknown);

        assert!(calendar.is_holiday(date(2024, 4, 30)));
        // Unknown years fail open
        assert!(!calendar.is_holiday(date(2031, 4, 30)));
    }

    #[test]
    fn test_previous_trading_day_skips_weekend() {
        let calendar = calendar_2024(&[]);
        // Monday -> previous Friday
        assert_eq!(calendar.previous_trading_day(date(2024, 6, 10)), date(2024, 6, 7));
        // Saturday -> Friday
        assert_eq!(calendar.previous_trading_day(date(2024, 6, 8)), date(2024, 6, 7));
        // Wednesday -> Tuesday
        assert_eq!(calendar.previous_trading_day(date(2024, 6, 12)), date(2024, 6, 11));
    }

    #[test]
    fn test_previous_trading_day_skips_holidays() {
        // Reunification Day and Labour Day 2024 (Tue/Wed)
        let calendar = calendar_2024(&[date(2024, 4, 29), date(2024, 4, 30), date(2024, 5, 1)]);
        assert_eq!(calendar.previous_trading_day(date(2024, 5, 2)), date(2024, 4, 26));
    }

    #[test]
    fn test_previous_trading_day_never_weekend_with_short_holiday_runs() {
        // Four consecutive weekday holidays, then walk every start date of the year
        let calendar = calendar_2024(&[
            date(2024, 2, 12),
            date(2024, 2, 13),
            date(2024, 2, 14),
            date(2024, 2, 15),
        ]);

        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            let previous = calendar.previous_trading_day(day);
            assert!(!calendar.is_weekend(previous), "{} -> {}", day, previous);
            assert!(!calendar.is_holiday(previous), "{} -> {}", day, previous);
            assert!(previous < day);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_previous_trading_day_soft_fails_after_lookback() {
        // Every day of the fortnight is a holiday
        let holidays: Vec<NaiveDate> = (1..=20).map(|d| date(2024, 3, d)).collect();
        let calendar = calendar_2024(&holidays);
        assert_eq!(calendar.previous_trading_day(date(2024, 3, 20)), date(2024, 3, 10));
    }

    #[test]
    fn test_lazy_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"2024": ["2024-09-02", "2024-09-03"]}}"#).unwrap();

        let calendar = TradingCalendar::from_file(file.path());
        assert!(calendar.is_holiday(date(2024, 9, 2)));
        assert_eq!(calendar.previous_trading_day(date(2024, 9, 4)), date(2024, 8, 30));
    }

    #[test]
    fn test_failed_load_is_not_retried_within_backoff() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("holidays.json");

        let calendar = TradingCalendar::from_file(&path);
        assert_eq!(calendar.holiday_status(date(2024, 9, 2)), HolidayStatus::Unknown);

        std::fs::write(&path, r#"{"2024": ["2024-09-02"]}"#).unwrap();
        assert_eq!(calendar.holiday_status(date(2024, 9, 2)), HolidayStatus::Unknown);
    }

    #[test]
    fn test_reload_after_backoff() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("holidays.json");
        std::fs::write(&path, "{}").unwrap();

        let mut calendar = TradingCalendar::from_file(&path);
        calendar.reload_backoff = StdDuration::ZERO;
        assert_eq!(calendar.holiday_status(date(2024, 9, 2)), HolidayStatus::Unknown);

        std::fs::write(&path, r#"{"2024": ["2024-09-02"]}"#).unwrap();
        assert_eq!(calendar.holiday_status(date(2024, 9, 2)), HolidayStatus::Holiday);
    }

    #[test]
    fn test_unknown_year_warns_once() {
        let calendar = calendar_2024(&[]);
        assert!(calendar.first_warning_for(2031));
        assert!(!calendar.first_warning_for(2031));
        assert!(calendar.first_warning_for(2032));
    }

    #[test]
    fn test_session_minutes() {
        // 08:59 -> 15:00
        assert_eq!(TradingHours::default().session_minutes(), 361);
    }

    #[test]
    fn test_missing_file_fails_open() {
        let calendar = TradingCalendar::from_file("/nonexistent/holidays.json");
        assert_eq!(calendar.holiday_status(date(2024, 1, 1)), HolidayStatus::Unknown);
        assert!(calendar.is_trading_day(date(2024, 1, 2)));
    }
}
