pub mod rank;
pub mod series;
pub mod window;

use std::sync::Arc;

use crate::error::Result;
use crate::models::SnapshotConfig;
use crate::services::{SystemClock, TradingCalendar, TradingWindowResolver, VciClient};

/// Shared pieces every command builds from the environment
pub(crate) struct AppContext {
    pub config: SnapshotConfig,
    pub clock: Arc<SystemClock>,
    pub calendar: Arc<TradingCalendar>,
}

impl AppContext {
    pub fn from_env() -> Result<Self> {
        let config = SnapshotConfig::from_env()?;
        let calendar = Arc::new(TradingCalendar::from_file(config.holidays_path.clone()));
        Ok(Self {
            config,
            clock: Arc::new(SystemClock::default()),
            calendar,
        })
    }

    pub fn resolver(&self) -> TradingWindowResolver {
        TradingWindowResolver::new(self.calendar.clone())
            .with_fetch_lookback_days(self.config.fetch_lookback_days)
    }

    pub fn quote_source(&self) -> Result<Arc<VciClient>> {
        Ok(Arc::new(VciClient::new(self.config.rate_limit_per_minute)?))
    }
}

/// Load the context or exit with a readable error
pub(crate) fn context_or_exit() -> AppContext {
    match AppContext::from_env() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
