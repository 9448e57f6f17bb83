use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{MarketCapRanking, SymbolAttribute, SymbolFailure, SymbolRanking};
use crate::services::quote_source::{QuoteError, QuoteSource};
use crate::services::worker_pool::WorkerPool;

/// Joined rankings plus the symbols whose traded value was substituted
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    pub rankings: Vec<SymbolRanking>,
    pub failures: Vec<SymbolFailure>,
}

/// Joins traded value onto an existing market-cap ranking
///
/// Only the already ranked symbols are queried. A symbol whose traded value
/// cannot be fetched stays in the output with a value of 0.
pub struct ValueAggregator {
    source: Arc<dyn QuoteSource>,
    pool: WorkerPool,
}

impl ValueAggregator {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            pool: WorkerPool::default(),
        }
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub async fn aggregate(&self, ranked: &[MarketCapRanking]) -> AggregateOutcome {
        if ranked.is_empty() {
            return AggregateOutcome::default();
        }

        let symbols: Vec<String> = ranked.iter().map(|r| r.symbol.clone()).collect();

        let report = self
            .pool
            .run("traded_value", &symbols, |symbol| {
                let source = self.source.clone();
                async move {
                    let board = source.point_in_time(std::slice::from_ref(&symbol)).await?;
                    board
                        .get(&symbol.to_uppercase())
                        .and_then(|entry| entry.traded_value)
                        .filter(|value| value.is_finite())
                        .ok_or(QuoteError::NoData)
                }
            })
            .await;

        let values: HashMap<String, f64> = report.successes.into_iter().collect();
        let failures: Vec<SymbolFailure> = report
            .failures
            .into_iter()
            .map(|(symbol, e)| SymbolFailure {
                symbol,
                attribute: SymbolAttribute::TradedValue,
                reason: e.to_string(),
            })
            .collect();

        // Ranker order is preserved; the join never drops a symbol
        let rankings: Vec<SymbolRanking> = ranked
            .iter()
            .map(|r| {
                let traded_value = values.get(&r.symbol).copied().unwrap_or(0.0);
                SymbolRanking::new(r.symbol.clone(), r.market_cap, traded_value)
            })
            .collect();

        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                symbols = ?failures.iter().take(5).map(|f| f.symbol.as_str()).collect::<Vec<_>>(),
                "Traded value unavailable, defaulting to 0"
            );
        }
        info!(symbols = rankings.len(), "Joined traded value onto ranking");

        AggregateOutcome { rankings, failures }
    }
}
