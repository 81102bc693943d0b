use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info};
use crate::core::cache::CacheLayer;
use crate::core::library::LibraryResult;

const SCAN_BATCH: usize = 200;

// glob pattern matching every key that starts with prefix
fn match_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// Shared cache for multi-instance deployments. Values are the same JSON text
/// the local cache keeps.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> LibraryResult<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        info!("connected to redis cache");
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get(&self, key: &str) -> LibraryResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String) -> LibraryResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn evict(&self, key: &str) -> LibraryResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    // walks the keyspace with SCAN so the server is never blocked by KEYS
    async fn evict_prefix(&self, prefix: &str) -> LibraryResult<()> {
        let mut conn = self.connection.clone();
        let pattern = match_pattern(prefix);
        let mut cursor: u64 = 0;
        let mut evicted = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                evicted += keys.len();
                let _: () = conn.del(keys).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(prefix = %prefix, evicted = evicted, "cache prefix evicted");
        Ok(())
    }
}
