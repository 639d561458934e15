use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Persistent cache stored in a fjall partition.
///
/// Keys and entries are JSON encoded. Expired entries are removed on read.
pub struct DiskCache<K, V> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync,
    V: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(partition, PartitionCreateOptions::default())?;
        Ok(Self {
            keyspace,
            partition,
            _marker: PhantomData,
        })
    }

    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(bytes) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| expires_at <= SystemTime::now())
        {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }

        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        // The process usually exits right after a put.
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Cache PUT for key: {:?}", key);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        for key in self.partition.keys() {
            self.partition.remove(key?)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCache get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        if let Err(e) = self.write(&key, value, ttl) {
            debug!("DiskCache put error: {}", e);
        }
    }

    async fn remove(&self, key: &K) {
        let res: Result<()> = (|| Ok(self.partition.remove(serde_json::to_vec(key)?)?))();
        if let Err(e) = res {
            debug!("DiskCache remove error: {}", e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.delete_all() {
            debug!("DiskCache clear error: {}", e);
        }
    }
}
