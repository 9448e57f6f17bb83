//! Long-lived on-disk ranking cache
//!
//! One JSON file per group code:
//!
//! ```json
//! { "cache_date": "2024-06-07T08:00:00+00:00",
//!   "top_n": 35,
//!   "data": [ {"symbol": "ABC", "market_cap": 1234.5, "total_value": 6789.0} ] }
//! ```
//!
//! `top_n` is the row limit the ranking was built with; older files omit it.
//!
//! Reads never fail: a missing, unreadable, corrupt or expired file is a miss.
//! Writes for the same group are serialized and land via temp file + rename.

use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::constants::DISK_CACHE_TTL_DAYS;
use crate::error::{AppError, Result};
use crate::models::SymbolRanking;
use crate::services::clock::Clock;
use crate::utils::parse_local_timestamp;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    cache_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_n: Option<usize>,
    data: Vec<SymbolRanking>,
}

/// A fresh cache entry
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRanking {
    pub rankings: Vec<SymbolRanking>,
    /// Row limit the entry was built with, when recorded
    pub top_n: Option<usize>,
}

impl CachedRanking {
    /// Whether this entry holds every row a `top_n` request would get upstream
    ///
    /// Entries without a recorded limit are taken as complete.
    pub fn covers(&self, top_n: usize) -> bool {
        match self.top_n {
            Some(saved) => saved >= top_n || self.rankings.len() >= top_n,
            None => true,
        }
    }
}

pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(dir, clock, Duration::days(DISK_CACHE_TTL_DAYS))
    }

    pub fn with_ttl(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the cache file for `group_code`
    pub fn path_for(&self, group_code: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_group_code(group_code)))
    }

    /// Cached rankings for `group_code`, if the file exists and is fresh
    pub async fn load(&self, group_code: &str) -> Option<Vec<SymbolRanking>> {
        self.load_entry(group_code).await.map(|entry| entry.rankings)
    }

    /// Like [`DiskCache::load`], keeping the recorded `top_n`
    pub async fn load_entry(&self, group_code: &str) -> Option<CachedRanking> {
        let path = self.path_for(group_code);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(group = group_code, path = %path.display(), "No ranking cache file");
                return None;
            }
            Err(e) => {
                warn!(group = group_code, path = %path.display(), error = %e, "Failed to read ranking cache");
                return None;
            }
        };

        let file: CacheFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!(group = group_code, path = %path.display(), error = %e, "Corrupt ranking cache, ignoring");
                return None;
            }
        };

        let Some(age) = self.age_of(&file.cache_date) else {
            warn!(group = group_code, cache_date = %file.cache_date, "Unparseable cache_date, ignoring");
            return None;
        };

        if age >= self.ttl {
            debug!(group = group_code, age_days = age.num_days(), "Ranking cache expired");
            return None;
        }

        debug!(group = group_code, entries = file.data.len(), age_days = age.num_days(), "Ranking cache hit");
        Some(CachedRanking {
            rankings: file.data,
            top_n: file.top_n,
        })
    }

    /// Overwrite the cache file for `group_code` with `rankings`
    pub async fn save(&self, group_code: &str, rankings: &[SymbolRanking]) -> Result<()> {
        self.save_with_top_n(group_code, rankings, None).await
    }

    /// Overwrite the cache file, recording the row limit used to build it
    pub async fn save_with_top_n(
        &self,
        group_code: &str,
        rankings: &[SymbolRanking],
        top_n: Option<usize>,
    ) -> Result<()> {
        let lock = self.group_lock(group_code).await;
        let _guard = lock.lock().await;

        fs::create_dir_all(&self.dir).await?;

        let file = CacheFile {
            cache_date: self.clock.now_utc().to_rfc3339(),
            top_n,
            data: rankings.iter().map(SymbolRanking::normalized).collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let path = self.path_for(group_code);
        let temp_path = path.with_extension("json.tmp");

        if let Err(e) = fs::write(&temp_path, json.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::Io(format!(
                "failed to write {}: {}",
                temp_path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::Io(format!(
                "failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        info!(group = group_code, path = %path.display(), entries = file.data.len(), "Saved ranking cache");
        Ok(())
    }

    async fn group_lock(&self, group_code: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks
            .entry(sanitize_group_code(group_code))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Age of a stored `cache_date`; naive timestamps are market-local
    fn age_of(&self, cache_date: &str) -> Option<Duration> {
        if let Ok(written) = DateTime::parse_from_rfc3339(cache_date) {
            return Some(self.clock.now_utc().signed_duration_since(written));
        }
        let written: NaiveDateTime = parse_local_timestamp(cache_date).ok()?;
        Some(self.clock.market_now().signed_duration_since(written))
    }
}

/// File-safe form of a group code
fn sanitize_group_code(group_code: &str) -> String {
    let sanitized: String = group_code
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}
