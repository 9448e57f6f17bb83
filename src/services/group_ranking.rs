use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::constants::DEFAULT_TOP_N;
use crate::models::{DataOrigin, GroupRanking};
use crate::services::disk_cache::DiskCache;
use crate::services::ranker::ConcurrentRanker;
use crate::services::value_aggregator::ValueAggregator;

/// Treemap ranking for a symbol group
///
/// The disk cache is consulted first; on a hit no upstream call is made and
/// the cached rows are cut to `top_n`. An entry built with a smaller limit
/// than requested counts as a miss. On a miss the group is ranked by market cap, traded value is joined in
/// and the merged result is persisted (unless it came back empty).
pub struct GroupRankingService {
    disk_cache: Arc<DiskCache>,
    ranker: ConcurrentRanker,
    aggregator: ValueAggregator,
    top_n: usize,
}

impl GroupRankingService {
    pub fn new(disk_cache: Arc<DiskCache>, ranker: ConcurrentRanker, aggregator: ValueAggregator) -> Self {
        Self {
            disk_cache,
            ranker,
            aggregator,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub async fn get_group_ranking(&self, group_code: &str) -> GroupRanking {
        let group_code = group_code.trim().to_uppercase();

        match self.disk_cache.load_entry(&group_code).await {
            Some(entry) if entry.covers(self.top_n) => {
                let mut rankings = entry.rankings;
                rankings.truncate(self.top_n);
                info!(group = %group_code, entries = rankings.len(), "Serving group ranking from disk cache");
                return GroupRanking {
                    group_code,
                    rankings,
                    origin: DataOrigin::Cache,
                    failures: Vec::new(),
                };
            }
            Some(entry) => {
                debug!(
                    group = %group_code,
                    cached = entry.rankings.len(),
                    cached_top_n = ?entry.top_n,
                    top_n = self.top_n,
                    "Cached group ranking is smaller than requested, rebuilding"
                );
            }
            None => {}
        }

        let started = Instant::now();
        let ranked = self.ranker.rank_by_symbol_group(&group_code, self.top_n).await;
        let merged = self.aggregator.aggregate(&ranked.rankings).await;

        let mut failures = ranked.failures;
        failures.extend(merged.failures);

        if merged.rankings.is_empty() {
            info!(group = %group_code, "Empty group ranking, not persisting");
        } else if let Err(e) = self
            .disk_cache
            .save_with_top_n(&group_code, &merged.rankings, Some(self.top_n))
            .await
        {
            error!(group = %group_code, error = %e, "Failed to persist group ranking");
        }

        info!(
            group = %group_code,
            universe = ranked.universe_size,
            ranked = merged.rankings.len(),
            failures = failures.len(),
            duration_s = started.elapsed().as_secs_f64(),
            "Built group ranking"
        );

        GroupRanking {
            group_code,
            rankings: merged.rankings,
            origin: DataOrigin::Upstream,
            failures,
        }
    }
}
