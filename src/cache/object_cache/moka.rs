use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaCacheWrapper);

/// Moka 内存缓存，整体 TTL 取自 `cache.default_ttl`
pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        Ok(Self::with_settings(
            config.cache.memory.max_capacity,
            config.cache.default_ttl,
        ))
    }

    pub fn with_settings(max_capacity: u64, ttl_secs: u64) -> Self {
        if ttl_secs == 0 {
            debug!("Moka cache TTL is 0, entries live until evicted by capacity");
        }
        let mut builder = Cache::builder().max_capacity(max_capacity);
        if ttl_secs > 0 {
            builder = builder.time_to_live(Duration::from_secs(ttl_secs));
        }
        debug!(
            "MokaCacheWrapper initialized with max capacity: {}",
            max_capacity
        );
        Self {
            inner: builder.build(),
        }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => CacheResult::Found(value),
            None => CacheResult::NotFound,
        }
    }

    async fn insert_raw(&self, key: String, value: String, _ttl: u64) {
        // 条目 TTL 由构建时的全局策略决定
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_json_roundtrip_and_remove() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(16, 60));
        cache
            .insert_json("session:1".to_string(), &vec![1_i64, 2, 3], 60)
            .await;
        assert_eq!(
            cache.get_json::<Vec<i64>>("session:1").await,
            CacheResult::Found(vec![1, 2, 3])
        );

        cache.remove("session:1").await;
        assert_eq!(
            cache.get_json::<Vec<i64>>("session:1").await,
            CacheResult::NotFound
        );
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_dropped() {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(16, 60));
        cache
            .insert_raw("broken".to_string(), "not json".to_string(), 0)
            .await;
        assert_eq!(cache.get_json::<i64>("broken").await, CacheResult::NotFound);
        assert_eq!(cache.get_raw("broken").await, CacheResult::NotFound);
    }
}
