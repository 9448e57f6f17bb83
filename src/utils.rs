use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Get holiday file path from environment variable or use default
pub fn get_holidays_path() -> PathBuf {
    std::env::var("HOLIDAYS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("holidays.json"))
}

/// Get ranking cache directory from environment variable or use default
pub fn get_ranking_cache_dir() -> PathBuf {
    std::env::var("RANKING_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cache").join("treemap"))
}

/// Parse a market-local timestamp.
///
/// Accepts "YYYY-MM-DDTHH:MM:SS", "YYYY-MM-DD HH:MM:SS" (optionally with
/// fractional seconds) and a bare "YYYY-MM-DD", which maps to midnight.
pub fn parse_local_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("Invalid timestamp: {}", s))
}

/// Format a market-local timestamp the way cache keys and logs print it
pub fn format_local_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 7)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();

        assert_eq!(parse_local_timestamp("2024-06-07T09:15:00").unwrap(), expected);
        assert_eq!(parse_local_timestamp("2024-06-07 09:15:00").unwrap(), expected);
        assert_eq!(parse_local_timestamp("2024-06-07T09:15").unwrap(), expected);
        assert_eq!(
            parse_local_timestamp("2024-06-07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_local_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_format_local_timestamp() {
        let dt = NaiveDate::from_ymd_opt(2024, 6, 7)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        assert_eq!(format_local_timestamp(&dt), "2024-06-07 15:00:00");
    }
}
