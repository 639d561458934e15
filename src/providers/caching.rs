use crate::core::cache::Cache;
use crate::core::config::FetchWindow;
use crate::core::error::InflationError;
use crate::core::rates::{MonthlyRates, RateProvider, RateSource, normalize};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const CACHE_KEY: &str = "inflation_data_monthly";

/// Cache key for one series over one fetch window. Sources that share a
/// store never see each other's data.
pub fn cache_key(series: &str, window: &FetchWindow) -> String {
    format!("{CACHE_KEY}:{series}:{}:{}", window.start, window.end)
}

/// Normalized monthly rates served from a cache, fetched on a miss.
///
/// No lock is held while fetching: callers racing on a cold cache each fetch
/// and the last write wins. Every writer stores the same normalized data, so
/// this only costs duplicate requests.
pub struct CachedRateProvider {
    source: Arc<dyn RateSource>,
    cache: Arc<dyn Cache<String, MonthlyRates>>,
    window: FetchWindow,
    ttl: Duration,
    key: String,
}

impl CachedRateProvider {
    pub fn new(
        source: Arc<dyn RateSource>,
        cache: Arc<dyn Cache<String, MonthlyRates>>,
        window: FetchWindow,
        ttl: Duration,
    ) -> Self {
        let key = cache_key(source.series(), &window);
        Self {
            source,
            cache,
            window,
            ttl,
            key,
        }
    }
}

#[async_trait]
impl RateProvider for CachedRateProvider {
    async fn monthly_rates(&self) -> Result<MonthlyRates, InflationError> {
        if let Some(cached) = self.cache.get(&self.key).await {
            debug!(key = %self.key, "Cache hit for monthly rates");
            return Ok(cached);
        }
        debug!(key = %self.key, "Cache miss for monthly rates");

        let records = self
            .source
            .fetch_rates(self.window.start, self.window.end)
            .await
            .filter(|records| !records.is_empty())
            .ok_or(InflationError::FetchFailed)?;

        let rates = normalize(&records);
        if rates.is_empty() {
            return Err(InflationError::EmptyData);
        }
        debug!(
            rows = records.len(),
            months = rates.len(),
            "Normalized rate data"
        );

        self.cache
            .put(self.key.clone(), rates.clone(), Some(self.ttl))
            .await;
        Ok(rates)
    }
}
