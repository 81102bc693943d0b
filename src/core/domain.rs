use std::fmt::Display;
use std::hash::Hash;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::core::cache::CacheStore;
use crate::core::repository::RepositoryStore;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    type Id: Copy + Eq + Ord + Hash + Display + Send + Sync + Serialize + DeserializeOwned + 'static;

    // storage assigned identifier, None until the entity is first saved
    fn id(&self) -> Option<Self::Id>;
}

// Entity is a persisted record that can be stored, cached and looked up by
// unique fields
pub trait Entity: Identifiable + Clone + Serialize + DeserializeOwned + 'static {
    // prefix of cache keys and storage tables, e.g. "book"
    const NAME: &'static str;
    // name used in error messages, e.g. "Book"
    const LABEL: &'static str;

    fn audit(&self) -> Option<AuditInfo>;

    // called by storage when the record is written
    fn assign(&mut self, id: Self::Id, audit: AuditInfo);

    fn unique_fields() -> &'static [&'static str] {
        &[]
    }

    fn lookup_field(&self, _field: &str) -> Option<String> {
        None
    }

    // cache key prefixes of entity specific lookups, evicted on every write
    fn lookup_prefixes() -> Vec<String> {
        vec![]
    }
}

// AuditInfo keeps creation and modification timestamps of an entity
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub struct AuditInfo {
    #[serde(with = "crate::utils::date::serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::utils::date::serializer")]
    pub updated_at: NaiveDateTime,
}

impl AuditInfo {
    pub fn new(now: NaiveDateTime) -> Self {
        AuditInfo {
            created_at: now,
            updated_at: now,
        }
    }

    // updated_at never moves before created_at
    pub fn touch(&self, now: NaiveDateTime) -> Self {
        AuditInfo {
            created_at: self.created_at,
            updated_at: std::cmp::max(now, self.created_at),
        }
    }
}

// Which authorization table guards the write endpoints
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum SecurityPolicy {
    AdminWrites,
    Open,
}

// What happens to the books of an author being deleted
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum AuthorDeletePolicy {
    Orphan,
    Cascade,
    Reject,
}

// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub store: RepositoryStore,
    pub cache: CacheStore,
    pub redis_url: String,
    pub dynamodb_endpoint: String,
    pub security: SecurityPolicy,
    pub author_delete: AuthorDeletePolicy,
    pub admin_keys: Vec<String>,
    pub user_keys: Vec<String>,
    pub bind_addr: String,
}

impl Configuration {
    pub fn new(store: RepositoryStore, cache: CacheStore) -> Self {
        Configuration {
            store,
            cache,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            dynamodb_endpoint: "http://localhost:8000".to_string(),
            security: SecurityPolicy::AdminWrites,
            author_delete: AuthorDeletePolicy::Orphan,
            admin_keys: vec![],
            user_keys: vec![],
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    // loads .env if present and then reads LIBRARY_* variables
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let store = match lookup("LIBRARY_STORE").as_deref() {
            None | Some("memory") => RepositoryStore::Memory,
            Some("dynamodb") => RepositoryStore::DynamoDB,
            Some("local-dynamodb") => RepositoryStore::LocalDynamoDB,
            Some(other) => {
                warn!("unknown LIBRARY_STORE {}, using memory", other);
                RepositoryStore::Memory
            }
        };
        let cache = match lookup("LIBRARY_CACHE").as_deref() {
            None | Some("local") => CacheStore::Local,
            Some("none") => CacheStore::Disabled,
            Some("redis") => CacheStore::Redis,
            Some(other) => {
                warn!("unknown LIBRARY_CACHE {}, using local", other);
                CacheStore::Local
            }
        };
        let security = match lookup("LIBRARY_SECURITY").as_deref() {
            None | Some("admin-writes") => SecurityPolicy::AdminWrites,
            Some("open") => SecurityPolicy::Open,
            Some(other) => {
                warn!("unknown LIBRARY_SECURITY {}, using admin-writes", other);
                SecurityPolicy::AdminWrites
            }
        };
        let author_delete = match lookup("LIBRARY_AUTHOR_DELETE").as_deref() {
            None | Some("orphan") => AuthorDeletePolicy::Orphan,
            Some("cascade") => AuthorDeletePolicy::Cascade,
            Some("reject") => AuthorDeletePolicy::Reject,
            Some(other) => {
                warn!("unknown LIBRARY_AUTHOR_DELETE {}, using orphan", other);
                AuthorDeletePolicy::Orphan
            }
        };
        let mut config = Configuration::new(store, cache);
        config.security = security;
        config.author_delete = author_delete;
        if let Some(url) = lookup("LIBRARY_REDIS_URL") {
            config.redis_url = url;
        }
        if let Some(endpoint) = lookup("LIBRARY_DYNAMODB_ENDPOINT") {
            config.dynamodb_endpoint = endpoint;
        }
        if let Some(addr) = lookup("LIBRARY_BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.admin_keys = split_keys(lookup("LIBRARY_ADMIN_KEYS"));
        config.user_keys = split_keys(lookup("LIBRARY_USER_KEYS"));
        config
    }
}

fn split_keys(value: Option<String>) -> Vec<String> {
    value.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use chrono::NaiveDate;
    use crate::core::cache::CacheStore;
    use crate::core::domain::{AuditInfo, AuthorDeletePolicy, Configuration, SecurityPolicy};
    use crate::core::repository::RepositoryStore;

    #[tokio::test]
    async fn test_should_build_default_config() {
        let config = Configuration::from_lookup(|_| None);
        assert_eq!(RepositoryStore::Memory, config.store);
        assert_eq!(CacheStore::Local, config.cache);
        assert_eq!(SecurityPolicy::AdminWrites, config.security);
        assert_eq!(AuthorDeletePolicy::Orphan, config.author_delete);
        assert_eq!("127.0.0.1:8080", config.bind_addr);
        assert!(config.admin_keys.is_empty());
    }

    #[tokio::test]
    async fn test_should_build_config_from_lookup() {
        let vars = HashMap::from([
            ("LIBRARY_STORE", "local-dynamodb"),
            ("LIBRARY_CACHE", "none"),
            ("LIBRARY_SECURITY", "open"),
            ("LIBRARY_AUTHOR_DELETE", "cascade"),
            ("LIBRARY_ADMIN_KEYS", "k1, k2,,"),
            ("LIBRARY_BIND_ADDR", "0.0.0.0:3000"),
        ]);
        let config = Configuration::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(RepositoryStore::LocalDynamoDB, config.store);
        assert_eq!(CacheStore::Disabled, config.cache);
        assert_eq!(SecurityPolicy::Open, config.security);
        assert_eq!(AuthorDeletePolicy::Cascade, config.author_delete);
        assert_eq!(vec!["k1".to_string(), "k2".to_string()], config.admin_keys);
        assert_eq!("0.0.0.0:3000", config.bind_addr);
    }

    #[tokio::test]
    async fn test_should_fall_back_to_strict_security() {
        let config = Configuration::from_lookup(|name| {
            if name == "LIBRARY_SECURITY" { Some("everyone".to_string()) } else { None }
        });
        assert_eq!(SecurityPolicy::AdminWrites, config.security);
    }

    #[tokio::test]
    async fn test_should_touch_audit_info() {
        let created = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let audit = AuditInfo::new(created);
        assert_eq!(created, audit.updated_at);
        assert_eq!(later, audit.touch(later).updated_at);
        assert_eq!(created, audit.touch(earlier).updated_at);
        assert_eq!(created, audit.touch(later).created_at);
    }
}
