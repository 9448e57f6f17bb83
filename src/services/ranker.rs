use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{MarketCapRanking, SymbolAttribute, SymbolFailure};
use crate::services::quote_source::{QuoteError, QuoteSource, RatioPeriod};
use crate::services::worker_pool::WorkerPool;

/// Market-cap ranking of a group plus the symbols that could not be ranked
#[derive(Debug, Clone, Default)]
pub struct RankOutcome {
    pub rankings: Vec<MarketCapRanking>,
    pub failures: Vec<SymbolFailure>,
    /// Members of the group before filtering and truncation
    pub universe_size: usize,
}

/// Ranks a symbol group by market capitalization
///
/// One ratio request per symbol, fanned out over a fresh [`WorkerPool`].
/// Symbols whose market cap cannot be obtained are dropped before sorting.
pub struct ConcurrentRanker {
    source: Arc<dyn QuoteSource>,
    pool: WorkerPool,
    period: RatioPeriod,
}

impl ConcurrentRanker {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            pool: WorkerPool::default(),
            period: RatioPeriod::Quarter,
        }
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub async fn rank_by_symbol_group(&self, group_code: &str, top_n: usize) -> RankOutcome {
        let symbols = match self.source.symbols_by_group(group_code).await {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!(group = group_code, error = %e, "Failed to fetch group members");
                return RankOutcome::default();
            }
        };

        if symbols.is_empty() {
            warn!(group = group_code, "Group has no members");
            return RankOutcome::default();
        }

        let period = self.period;
        let report = self
            .pool
            .run("market_cap", &symbols, |symbol| {
                let source = self.source.clone();
                async move {
                    let ratio = source.ratio(&symbol, period).await?;
                    match ratio.market_cap {
                        Some(cap) if cap.is_finite() => Ok(cap),
                        _ => Err(QuoteError::NoData),
                    }
                }
            })
            .await;

        let failures: Vec<SymbolFailure> = report
            .failures
            .into_iter()
            .map(|(symbol, e)| SymbolFailure {
                symbol,
                attribute: SymbolAttribute::MarketCap,
                reason: e.to_string(),
            })
            .collect();

        let mut rankings: Vec<MarketCapRanking> = report
            .successes
            .into_iter()
            .map(|(symbol, market_cap)| MarketCapRanking { symbol, market_cap })
            .collect();

        // Ties keep group order (stable sort)
        rankings.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
        rankings.truncate(top_n);

        if !failures.is_empty() {
            warn!(
                group = group_code,
                failed = failures.len(),
                symbols = ?failures.iter().take(5).map(|f| f.symbol.as_str()).collect::<Vec<_>>(),
                "Market cap unavailable for some symbols"
            );
        }
        info!(group = group_code, universe = symbols.len(), ranked = rankings.len(), top_n, "Ranked group by market cap");

        RankOutcome {
            rankings,
            failures,
            universe_size: symbols.len(),
        }
    }
}
