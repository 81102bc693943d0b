use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::core::cache::CacheLayer;
use crate::core::domain::Entity;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::EntityStore;

/// Generic CRUD over an entity store with cache-aside reads.
///
/// Reads look in the cache first and populate it from storage on a miss.
/// Writes go to storage and then refresh the id entry and evict every listing
/// and lookup entry of the entity before returning, so a read that follows a
/// completed write never sees the previous state.
///
/// Cache keys:
/// * `<name>:<id>` for a single entity
/// * `<name>:all` for the whole collection
/// * `<name>:page:<page_number>-<page_size>` for pages
///
/// Every write bumps a generation shared by all clones of the service. A read
/// that loaded from storage while a write completed drops its cache entry
/// again, so it cannot leave the pre-write value behind.
pub struct EntityService<T: Entity, R: EntityStore<T> + ?Sized> {
    store: Arc<R>,
    cache: Arc<dyn CacheLayer>,
    generation: Arc<AtomicU64>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R: EntityStore<T> + ?Sized> Clone for EntityService<T, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            generation: self.generation.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity, R: EntityStore<T> + ?Sized> EntityService<T, R> {
    pub fn new(store: Arc<R>, cache: Arc<dyn CacheLayer>) -> Self {
        Self {
            store,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &R {
        self.store.as_ref()
    }

    pub fn id_key(id: T::Id) -> String {
        format!("{}:{}", T::NAME, id)
    }

    pub fn all_key() -> String {
        format!("{}:all", T::NAME)
    }

    pub fn page_prefix() -> String {
        format!("{}:page:", T::NAME)
    }

    pub fn page_key(page_number: usize, page_size: usize) -> String {
        format!("{}{}-{}", Self::page_prefix(), page_number, page_size)
    }

    /// Returns the cached value under key or runs loader, caching what it
    /// finds. A loader returning None is not cached.
    pub async fn cached<V, F, Fut>(&self, key: &str, loader: F) -> LibraryResult<Option<V>>
        where V: Serialize + DeserializeOwned + Send,
              F: FnOnce() -> Fut + Send,
              Fut: Future<Output=LibraryResult<Option<V>>> + Send {
        self.cached_when(key, loader, |_| true).await
    }

    // like cached, but only values accepted by cacheable are written back
    async fn cached_when<V, F, Fut, P>(&self, key: &str, loader: F, cacheable: P) -> LibraryResult<Option<V>>
        where V: Serialize + DeserializeOwned + Send,
              F: FnOnce() -> Fut + Send,
              Fut: Future<Output=LibraryResult<Option<V>>> + Send,
              P: FnOnce(&V) -> bool + Send {
        if let Some(json) = self.cache.get(key).await? {
            match serde_json::from_str::<V>(&json) {
                Ok(value) => {
                    debug!(key = %key, "cache hit");
                    return Ok(Some(value));
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "discarding unreadable cache entry");
                }
            }
        }
        debug!(key = %key, "cache miss");
        let started = self.generation.load(Ordering::SeqCst);
        let loaded = loader().await?;
        if let Some(ref value) = loaded {
            if cacheable(value) {
                self.cache.put(key, serde_json::to_string(value)?).await?;
                // a write finished while loading, the value may predate it
                if self.generation.load(Ordering::SeqCst) != started {
                    debug!(key = %key, "dropping cache entry loaded during a write");
                    self.cache.evict(key).await?;
                }
            }
        }
        Ok(loaded)
    }

    pub async fn find_by_id(&self, id: T::Id) -> LibraryResult<T> {
        let key = Self::id_key(id);
        let store = self.store.clone();
        self.cached(&key, || async move { store.get_by_id(id).await }).await?
            .ok_or_else(|| LibraryError::entity_not_found(T::LABEL, "id", &id))
    }

    pub async fn find_all(&self) -> LibraryResult<Vec<T>> {
        let store = self.store.clone();
        let all = self.cached(&Self::all_key(), || async move {
            store.get_all().await.map(Some)
        }).await?;
        Ok(all.unwrap_or_default())
    }

    pub async fn find_all_pageable(&self, page_number: usize, page_size: usize) -> LibraryResult<PaginatedResult<T>> {
        if page_size < 1 {
            return Err(LibraryError::validation("page size must not be less than one", Some("page_size".to_string())));
        }
        let store = self.store.clone();
        // pages past the end are answered but never cached
        let page = self.cached_when(&Self::page_key(page_number, page_size), || async move {
            let (items, total) = store.get_page(page_number, page_size).await?;
            Ok(Some(PaginatedResult::new(items, total, page_number, page_size)))
        }, |page: &PaginatedResult<T>| page.page_number < page.total_pages).await?;
        Ok(page.unwrap_or_else(|| PaginatedResult::new(vec![], 0, page_number, page_size)))
    }

    pub async fn save(&self, entity: &T) -> LibraryResult<T> {
        let saved = self.store.upsert(entity).await?;
        self.bump_generation();
        if let Some(id) = saved.id() {
            self.cache.put(&Self::id_key(id), serde_json::to_string(&saved)?).await?;
            info!(entity = T::NAME, id = %id, "saved");
        }
        self.evict_listings().await?;
        Ok(saved)
    }

    pub async fn delete_by_id(&self, id: T::Id) -> LibraryResult<()> {
        if !self.store.exists_by_id(id).await? {
            return Err(LibraryError::entity_not_found(T::LABEL, "id", &id));
        }
        self.store.delete_by_id(id).await?;
        self.evict_entity(id).await?;
        info!(entity = T::NAME, id = %id, "deleted");
        Ok(())
    }

    // drops the id entry along with every listing and lookup entry
    pub async fn evict_entity(&self, id: T::Id) -> LibraryResult<()> {
        self.bump_generation();
        self.cache.evict(&Self::id_key(id)).await?;
        self.evict_listings().await
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn evict_listings(&self) -> LibraryResult<()> {
        self.cache.evict(&Self::all_key()).await?;
        self.cache.evict_prefix(&Self::page_prefix()).await?;
        for prefix in T::lookup_prefixes() {
            self.cache.evict_prefix(&prefix).await?;
        }
        Ok(())
    }
}
