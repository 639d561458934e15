//! Cache abstraction shared by the rate providers.

use async_trait::async_trait;
use std::time::Duration;

/// A key-value cache with optional per-entry expiry.
///
/// Implementations never fail loudly: a broken backend behaves like an empty
/// cache and logs the problem.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key`. A `ttl` of `None` keeps the entry until removed.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
