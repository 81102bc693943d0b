pub mod local_cache;
pub mod redis_cache;

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::cache::local_cache::LocalCache;
use crate::core::cache::redis_cache::RedisCache;
use crate::core::library::LibraryResult;

// Key/value cache holding JSON text. Operations on a single key are atomic.
#[async_trait]
pub trait CacheLayer: Sync + Send {
    async fn get(&self, key: &str) -> LibraryResult<Option<String>>;

    async fn put(&self, key: &str, value: String) -> LibraryResult<()>;

    async fn evict(&self, key: &str) -> LibraryResult<()>;

    // removes every entry whose key starts with prefix
    async fn evict_prefix(&self, prefix: &str) -> LibraryResult<()>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum CacheStore {
    Disabled,
    Local,
    Redis,
}

// Cache that never holds anything, every read goes to storage
#[derive(Debug, Default)]
pub struct NoCache;

#[async_trait]
impl CacheLayer for NoCache {
    async fn get(&self, _key: &str) -> LibraryResult<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String) -> LibraryResult<()> {
        Ok(())
    }

    async fn evict(&self, _key: &str) -> LibraryResult<()> {
        Ok(())
    }

    async fn evict_prefix(&self, _prefix: &str) -> LibraryResult<()> {
        Ok(())
    }
}

pub async fn create_cache(store: CacheStore, redis_url: &str) -> LibraryResult<Arc<dyn CacheLayer>> {
    match store {
        CacheStore::Disabled => Ok(Arc::new(NoCache)),
        CacheStore::Local => Ok(Arc::new(LocalCache::new())),
        CacheStore::Redis => Ok(Arc::new(RedisCache::connect(redis_url).await?)),
    }
}
