pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::rates::MonthlyRates;
use disk::DiskCache;
use memory::MemoryCache;
use std::sync::Arc;
use tracing::{debug, warn};

const RATE_PARTITION: &str = "rates";

/// Opens the cache used for monthly rate data.
///
/// A persistent cache lives under `<data_path>/cache`. If it cannot be opened
/// the in-memory cache is used instead.
pub fn open_rate_cache(config: &AppConfig) -> Arc<dyn Cache<String, MonthlyRates>> {
    if !config.cache.persist {
        debug!("Using in-memory rate cache");
        return Arc::new(MemoryCache::<String, MonthlyRates>::new());
    }

    let opened = config.default_data_path().and_then(|path| {
        DiskCache::<String, MonthlyRates>::open(&path.join("cache"), RATE_PARTITION)
    });
    match opened {
        Ok(cache) => {
            debug!("Using on-disk rate cache");
            Arc::new(cache)
        }
        Err(e) => {
            warn!(error = %e, "Could not open on-disk cache, falling back to memory");
            Arc::new(MemoryCache::<String, MonthlyRates>::new())
        }
    }
}
