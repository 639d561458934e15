use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// In-memory cache backed by a `HashMap` behind an async mutex
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let expired = match cache.get(key) {
            Some(entry) => entry.expires_at.is_some_and(|at| at <= Instant::now()),
            None => {
                debug!("Cache MISS for key: {:?}", key);
                return None;
            }
        };
        if expired {
            debug!("Cache entry expired for key: {:?}", key);
            cache.remove(key);
            return None;
        }
        debug!("Cache HIT for key: {:?}", key);
        cache.get(key).map(|entry| entry.value.clone())
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, CacheValue { value, expires_at });
    }

    async fn remove(&self, key: &K) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<String, f64>::new();

        assert!(cache.get(&"2024-01".to_string()).await.is_none());

        cache.put("2024-01".to_string(), 6.7, None).await;
        assert_eq!(cache.get(&"2024-01".to_string()).await, Some(6.7));

        assert!(cache.get(&"2024-02".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, f64>::new();

        cache
            .put("rates".to_string(), 4.53, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"rates".to_string()).await, Some(4.53));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"rates".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_expired_immediately() {
        let cache = MemoryCache::<String, f64>::new();

        cache
            .put("rates".to_string(), 1.0, Some(Duration::ZERO))
            .await;
        assert!(cache.get(&"rates".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_remove_and_clear() {
        let cache = MemoryCache::<String, f64>::new();

        cache.put("a".to_string(), 1.0, None).await;
        cache.put("b".to_string(), 2.0, None).await;

        cache.remove(&"a".to_string()).await;
        assert!(cache.get(&"a".to_string()).await.is_none());
        assert_eq!(cache.get(&"b".to_string()).await, Some(2.0));

        cache.clear().await;
        assert!(cache.get(&"b".to_string()).await.is_none());
    }
}
