use chrono::Duration;
use std::sync::Arc;

use crate::constants::INDEX_TICKERS;
use crate::models::DataAvailability;
use crate::services::{MarketIndexService, SnapshotCache};
use crate::utils::format_local_timestamp;

use super::context_or_exit;

pub async fn run(index: String, top_n: Option<usize>) {
    let ctx = context_or_exit();

    if !INDEX_TICKERS.contains(&index.trim().to_uppercase().as_str()) {
        tracing::warn!(index = %index, known = ?INDEX_TICKERS, "Not a known index code, querying anyway");
    }

    let source = match ctx.quote_source() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let cache = Arc::new(SnapshotCache::with_limits(
        ctx.clock.clone(),
        Duration::seconds(ctx.config.short_cache_ttl_secs),
        ctx.config.short_cache_max_entries,
    ));
    let service = MarketIndexService::new(ctx.resolver(), cache, source, ctx.clock.clone());

    let series = service.get_index_series(&index, top_n).await;

    println!("📈 {} {}", series.index_code, series.window);

    if let DataAvailability::Unavailable { reason } = &series.availability {
        println!("   N/A ({})", reason);
        return;
    }
    if series.points.is_empty() {
        println!("   No data in window");
        return;
    }

    for point in &series.points {
        println!("   {}  {:>10.2}", format_local_timestamp(&point.time), point.value);
    }
    println!("   {} point(s)", series.points.len());
}
