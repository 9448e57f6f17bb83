use chrono::Duration;
use std::sync::Arc;

use crate::models::DataOrigin;
use crate::services::{
    ConcurrentRanker, DiskCache, GroupRankingService, ValueAggregator, WorkerPool,
};

use super::context_or_exit;

pub async fn run(group: String, top_n: Option<usize>) {
    let ctx = context_or_exit();

    let source = match ctx.quote_source() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = WorkerPool::new(ctx.config.worker_pool_size);
    let disk_cache = Arc::new(DiskCache::with_ttl(
        ctx.config.ranking_cache_dir.clone(),
        ctx.clock.clone(),
        Duration::days(ctx.config.disk_cache_ttl_days),
    ));
    let service = GroupRankingService::new(
        disk_cache,
        ConcurrentRanker::new(source.clone()).with_pool(pool),
        ValueAggregator::new(source).with_pool(pool),
    )
    .with_top_n(top_n.unwrap_or(ctx.config.top_n));

    let ranking = service.get_group_ranking(&group).await;

    let origin = match ranking.origin {
        DataOrigin::Cache => "disk cache",
        DataOrigin::Upstream => "VCI",
    };
    println!("🗺  {} ranking ({} symbols, from {})\n", ranking.group_code, ranking.rankings.len(), origin);

    if ranking.is_empty() {
        println!("   N/A (no symbols could be ranked)");
        return;
    }

    println!("   {:>3}  {:<8} {:>22} {:>22}", "#", "Symbol", "Market cap", "Traded value");
    for (i, row) in ranking.rankings.iter().enumerate() {
        println!(
            "   {:>3}  {:<8} {:>22.0} {:>22.0}",
            i + 1,
            row.symbol,
            row.market_cap,
            row.traded_value
        );
    }

    if !ranking.failures.is_empty() {
        println!("\n⚠️  {} symbol request(s) failed:", ranking.failures.len());
        for failure in &ranking.failures {
            println!("   {:<8} {:?}: {}", failure.symbol, failure.attribute, failure.reason);
        }
    }
}
