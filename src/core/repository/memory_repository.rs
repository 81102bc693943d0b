use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use crate::core::domain::{AuditInfo, Entity};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::EntityStore;

// In-process store keeping entities ordered by id. Writes are serialized by the
// lock so unique fields are checked and stored atomically.
#[derive(Debug)]
pub struct MemoryRepository<T: Entity<Id=i64>> {
    records: RwLock<BTreeMap<i64, T>>,
    sequence: AtomicI64,
    loads: AtomicUsize,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity<Id=i64>> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            sequence: AtomicI64::new(0),
            loads: AtomicUsize::new(0),
            _entity: PhantomData,
        }
    }

    // number of read queries served, used to observe cache hits
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::SeqCst);
    }

    fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn find_where<P: Fn(&T) -> bool + Send>(&self, predicate: P) -> Vec<T> {
        self.record_load();
        let records = self.records.read().await;
        records.values().filter(|e| predicate(e)).cloned().collect()
    }
}

impl<T: Entity<Id=i64>> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_unique<T: Entity<Id=i64>>(records: &BTreeMap<i64, T>, entity: &T, id: Option<i64>) -> LibraryResult<()> {
    for field in T::unique_fields() {
        if let Some(value) = entity.lookup_field(field) {
            let clash = records.values()
                .find(|other| other.id() != id && other.lookup_field(field).as_deref() == Some(value.as_str()));
            if let Some(other) = clash {
                return Err(LibraryError::conflict(
                    format!("{} with {}: {} already exists with id: {}.",
                            T::LABEL, field, value, other.id().unwrap_or_default()).as_str()));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl<T: Entity<Id=i64>> EntityStore<T> for MemoryRepository<T> {
    async fn get_by_id(&self, id: i64) -> LibraryResult<Option<T>> {
        self.record_load();
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn get_by_unique_field(&self, field: &str, value: &str) -> LibraryResult<Option<T>> {
        self.record_load();
        let records = self.records.read().await;
        Ok(records.values().find(|e| e.lookup_field(field).as_deref() == Some(value)).cloned())
    }

    async fn get_page(&self, page_number: usize, page_size: usize) -> LibraryResult<(Vec<T>, usize)> {
        self.record_load();
        let records = self.records.read().await;
        let total = records.len();
        let skip = page_number.checked_mul(page_size).unwrap_or(usize::MAX);
        let items = records.values().skip(skip).take(page_size).cloned().collect();
        Ok((items, total))
    }

    async fn get_all(&self) -> LibraryResult<Vec<T>> {
        self.record_load();
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn upsert(&self, entity: &T) -> LibraryResult<T> {
        let now = Utc::now().naive_utc();
        let mut records = self.records.write().await;
        let existing = entity.id().and_then(|id| records.get(&id).map(|e| (id, e.audit())));
        let mut saved = entity.clone();
        match existing {
            Some((id, audit)) => {
                check_unique(&records, entity, Some(id))?;
                let audit = audit.map(|a| a.touch(now)).unwrap_or_else(|| AuditInfo::new(now));
                saved.assign(id, audit);
            }
            None => {
                check_unique(&records, entity, None)?;
                saved.assign(self.next_id(), AuditInfo::new(now));
            }
        }
        if let Some(id) = saved.id() {
            records.insert(id, saved.clone());
        }
        Ok(saved)
    }

    async fn exists_by_id(&self, id: i64) -> LibraryResult<bool> {
        let records = self.records.read().await;
        Ok(records.contains_key(&id))
    }

    async fn delete_by_id(&self, id: i64) -> LibraryResult<()> {
        let mut records = self.records.write().await;
        records.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use crate::books::domain::model::BookEntity;
    use crate::core::library::LibraryError;
    use crate::core::repository::EntityStore;
    use crate::core::repository::memory_repository::MemoryRepository;

    #[tokio::test]
    async fn test_should_create_get_books() {
        let repo = MemoryRepository::<BookEntity>::new();
        let book = BookEntity::new("Book1", "ISBN1", BigDecimal::from(2500), None);
        let saved = repo.upsert(&book).await.expect("should save book");
        assert_eq!(Some(1), saved.id);
        let audit = saved.audit.expect("should assign audit");
        assert_eq!(audit.created_at, audit.updated_at);

        let loaded = repo.get_by_id(1).await.expect("should get book").expect("should find book");
        assert_eq!(saved, loaded);
        assert!(repo.exists_by_id(1).await.expect("should check book"));
        assert!(repo.get_by_id(2).await.expect("should get book").is_none());
    }

    #[tokio::test]
    async fn test_should_update_book_keeping_created_at() {
        let repo = MemoryRepository::<BookEntity>::new();
        let saved = repo.upsert(&BookEntity::new("Book1", "ISBN1", BigDecimal::from(2500), None))
            .await.expect("should save book");
        let mut changed = saved.clone();
        changed.title = "Renamed".to_string();
        let updated = repo.upsert(&changed).await.expect("should update book");
        assert_eq!(saved.id, updated.id);
        let before = saved.audit.expect("should have audit");
        let after = updated.audit.expect("should have audit");
        assert_eq!(before.created_at, after.created_at);
        assert!(after.updated_at >= after.created_at);
        assert_eq!(1, repo.get_all().await.expect("should list books").len());
    }

    #[tokio::test]
    async fn test_should_assign_fresh_id_for_unknown_id() {
        let repo = MemoryRepository::<BookEntity>::new();
        let _ = repo.upsert(&BookEntity::new("Book1", "ISBN1", BigDecimal::from(1), None)).await.expect("should save book");
        let mut book = BookEntity::new("Book2", "ISBN2", BigDecimal::from(2), None);
        book.id = Some(99);
        let saved = repo.upsert(&book).await.expect("should save book");
        assert_eq!(Some(2), saved.id);

        repo.delete_by_id(2).await.expect("should delete book");
        let again = repo.upsert(&BookEntity::new("Book3", "ISBN3", BigDecimal::from(3), None)).await.expect("should save book");
        assert_eq!(Some(3), again.id);
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn() {
        let repo = MemoryRepository::<BookEntity>::new();
        let first = repo.upsert(&BookEntity::new("Book1", "ISBN1", BigDecimal::from(1), None)).await.expect("should save book");
        let res = repo.upsert(&BookEntity::new("Other", "ISBN1", BigDecimal::from(5), None)).await;
        assert!(matches!(res, Err(LibraryError::Conflict { .. })));

        // re-saving the same record with its own isbn is fine
        let resaved = repo.upsert(&first).await.expect("should update book");
        assert_eq!(first.id, resaved.id);
        assert_eq!(1, repo.get_all().await.expect("should list books").len());
    }

    #[tokio::test]
    async fn test_should_page_books() {
        let repo = MemoryRepository::<BookEntity>::new();
        for i in 0..25 {
            let _ = repo.upsert(&BookEntity::new(format!("title_{}", i).as_str(), format!("isbn_{}", i).as_str(),
                                                 BigDecimal::from(i), None)).await.expect("should save book");
        }
        let (items, total) = repo.get_page(0, 10).await.expect("should page books");
        assert_eq!(25, total);
        assert_eq!(10, items.len());
        assert_eq!(Some(1), items[0].id);
        let (items, _) = repo.get_page(2, 10).await.expect("should page books");
        assert_eq!(5, items.len());
        assert_eq!(Some(21), items[0].id);
        let (items, _) = repo.get_page(usize::MAX, 10).await.expect("should page books");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_should_find_by_unique_field() {
        let repo = MemoryRepository::<BookEntity>::new();
        let _ = repo.upsert(&BookEntity::new("Book1", "ISBN1", BigDecimal::from(1), None)).await.expect("should save book");
        let _ = repo.upsert(&BookEntity::new("Book2", "ISBN2", BigDecimal::from(2), None)).await.expect("should save book");
        let loaded = repo.get_by_unique_field("isbn", "ISBN2").await.expect("should query").expect("should find book");
        assert_eq!(Some(2), loaded.id);
        assert!(repo.get_by_unique_field("isbn", "NOPE").await.expect("should query").is_none());
    }
}
