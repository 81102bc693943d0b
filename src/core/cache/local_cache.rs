use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use crate::core::cache::CacheLayer;
use crate::core::library::LibraryResult;

/// Single-instance cache backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct LocalCache {
    entries: DashMap<String, String>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheLayer for LocalCache {
    async fn get(&self, key: &str) -> LibraryResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: String) -> LibraryResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn evict(&self, key: &str) -> LibraryResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn evict_prefix(&self, prefix: &str) -> LibraryResult<()> {
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        debug!(prefix = %prefix, evicted = before.saturating_sub(self.entries.len()), "cache prefix evicted");
        Ok(())
    }
}
