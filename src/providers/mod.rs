pub mod caching;
pub mod evds;

pub use caching::CachedRateProvider;
pub use evds::EvdsProvider;
