use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};

/// Public holidays grouped by year
///
/// Holiday files are JSON objects keyed by year, each holding ISO dates:
///
/// ```json
/// { "2024": ["2024-01-01", "2024-04-30", "2024-05-01"] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolidaySet {
    #[serde(flatten)]
    years: HashMap<String, BTreeSet<NaiveDate>>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load holidays from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read holiday file {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse holidays from JSON text; unparseable dates are skipped
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(content)?;

        let mut set = Self::new();
        for (year, dates) in raw {
            let entry = set.years.entry(year.clone()).or_default();
            for date_str in dates {
                match NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
                    Ok(date) => {
                        entry.insert(date);
                    }
                    Err(e) => {
                        warn!(year = %year, date = %date_str, error = %e, "Skipping unparseable holiday date");
                    }
                }
            }
        }

        Ok(set)
    }

    /// Build from a list of dates, grouping them by their own year
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        let mut set = Self::new();
        for date in dates {
            set.insert(date);
        }
        set
    }

    pub fn insert(&mut self, date: NaiveDate) {
        self.years
            .entry(date.year().to_string())
            .or_default()
            .insert(date);
    }

    /// Register a year as known, even if it has no holidays
    pub fn insert_year(&mut self, year: i32) {
        self.years.entry(year.to_string()).or_default();
    }

    /// Holidays of a given year, or `None` when the year is not covered
    pub fn year(&self, year: i32) -> Option<&BTreeSet<NaiveDate>> {
        self.years.get(&year.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Covered years, sorted
    pub fn years(&self) -> Vec<String> {
        let mut years: Vec<String> = self.years.keys().cloned().collect();
        years.sort();
        years
    }
}
