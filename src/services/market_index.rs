use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::models::{DataAvailability, DataOrigin, IndexPoint, IndexSeries, Interval};
use crate::services::clock::Clock;
use crate::services::quote_source::QuoteSource;
use crate::services::short_term_cache::{window_cache_key, ShortTermCache};
use crate::services::window_resolver::TradingWindowResolver;

/// Shared snapshot cache: full filtered window per (index, window) key
pub type SnapshotCache = ShortTermCache<Vec<IndexPoint>>;

/// Recent history of an index for the current trading window
///
/// Resolver -> cache -> quote source -> cache write. Upstream failures come
/// back as an empty, `Unavailable` series; this never returns an error.
pub struct MarketIndexService {
    resolver: TradingWindowResolver,
    cache: Arc<SnapshotCache>,
    source: Arc<dyn QuoteSource>,
    clock: Arc<dyn Clock>,
}

impl MarketIndexService {
    pub fn new(
        resolver: TradingWindowResolver,
        cache: Arc<SnapshotCache>,
        source: Arc<dyn QuoteSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            cache,
            source,
            clock,
        }
    }

    /// Series for `index_code`; `top_n` keeps only the most recent points
    pub async fn get_index_series(&self, index_code: &str, top_n: Option<usize>) -> IndexSeries {
        let index_code = index_code.trim().to_uppercase();
        let resolved = self.resolver.resolve(self.clock.market_now());
        let cache_key = window_cache_key(&index_code, &resolved.window);

        if let Some(points) = self.cache.get(&cache_key).await {
            debug!(index = %index_code, key = %cache_key, points = points.len(), "Snapshot cache hit");
            return IndexSeries {
                index_code,
                window: resolved.window,
                points: take_latest(points, top_n),
                availability: DataAvailability::Available,
                origin: DataOrigin::Cache,
            };
        }

        debug!(index = %index_code, key = %cache_key, "Snapshot cache miss");

        let fetch_start = Instant::now();
        let bars = match self
            .source
            .history(
                &index_code,
                resolved.fetch_range.start,
                resolved.fetch_range.end,
                Interval::Minute,
            )
            .await
        {
            Ok(bars) => bars,
            Err(e) => {
                warn!(
                    index = %index_code,
                    window = %resolved.window,
                    fetch_range = %resolved.fetch_range,
                    error = %e,
                    "Index history unavailable"
                );
                return IndexSeries {
                    index_code,
                    window: resolved.window,
                    points: Vec::new(),
                    availability: DataAvailability::Unavailable {
                        reason: e.to_string(),
                    },
                    origin: DataOrigin::Upstream,
                };
            }
        };

        let points = resolved.filter(&bars);
        info!(
            index = %index_code,
            window = %resolved.window,
            raw_bars = bars.len(),
            points = points.len(),
            duration_ms = fetch_start.elapsed().as_millis() as u64,
            "Fetched index history"
        );

        self.cache.put(cache_key, points.clone()).await;

        IndexSeries {
            index_code,
            window: resolved.window,
            points: take_latest(points, top_n),
            availability: DataAvailability::Available,
            origin: DataOrigin::Upstream,
        }
    }
}

fn take_latest(mut points: Vec<IndexPoint>, top_n: Option<usize>) -> Vec<IndexPoint> {
    if let Some(n) = top_n {
        if points.len() > n {
            points.drain(..points.len() - n);
        }
    }
    points
}
