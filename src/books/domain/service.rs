use std::sync::Arc;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tracing::instrument;
use crate::authors::domain::AuthorService;
use crate::books::domain::BookService;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::EntityStore;
use crate::core::service::EntityService;

pub type BookEntityService = EntityService<BookEntity, dyn BookRepository>;

pub struct BookServiceImpl {
    books: BookEntityService,
    authors: Arc<dyn AuthorService>,
}

impl BookServiceImpl {
    pub fn new(books: BookEntityService, authors: Arc<dyn AuthorService>) -> Self {
        Self {
            books,
            authors,
        }
    }

    fn validate(book: &BookEntity) -> LibraryResult<()> {
        if book.title.trim().is_empty() {
            return Err(LibraryError::validation("book title must not be empty", Some("title".to_string())));
        }
        if book.isbn.trim().is_empty() {
            return Err(LibraryError::validation("book isbn must not be empty", Some("isbn".to_string())));
        }
        if book.price < BigDecimal::from(0i64) {
            return Err(LibraryError::validation("book price must not be negative", Some("price".to_string())));
        }
        Ok(())
    }
}

#[async_trait]
impl BookService for BookServiceImpl {
    async fn find_by_id(&self, id: i64) -> LibraryResult<BookEntity> {
        self.books.find_by_id(id).await
    }

    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>> {
        self.books.find_all().await
    }

    async fn find_all_pageable(&self, page_number: usize, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        self.books.find_all_pageable(page_number, page_size).await
    }

    async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<BookEntity> {
        let store = self.books.store();
        self.books.cached(&BookEntity::isbn_key(isbn), || async move {
            store.get_by_unique_field("isbn", isbn).await
        }).await?.ok_or_else(|| LibraryError::entity_not_found("Book", "isbn", &isbn))
    }

    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity> {
        let store = self.books.store();
        self.books.cached(&BookEntity::title_key(title), || async move {
            store.get_by_unique_field("title", title).await
        }).await?.ok_or_else(|| LibraryError::entity_not_found("Book", "title", &title))
    }

    async fn find_by_author(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>> {
        self.books.store().find_by_author_id(author_id).await
    }

    #[instrument(skip(self, book), fields(isbn = %book.isbn))]
    async fn save(&self, book: &BookEntity) -> LibraryResult<BookEntity> {
        Self::validate(book)?;
        if let Some(author_id) = book.author_id {
            // fails with not found before anything is written
            let _ = self.authors.find_by_id(author_id).await?;
        }
        if let Some(other) = self.books.store().get_by_unique_field("isbn", &book.isbn).await? {
            if other.id != book.id {
                return Err(LibraryError::conflict(
                    format!("Book with isbn: {} already exists.", book.isbn).as_str()));
            }
        }
        self.books.save(book).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> LibraryResult<()> {
        self.books.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use crate::authors::domain::model::AuthorEntity;
    use crate::books::domain::model::BookEntity;
    use crate::books::domain::BookService;
    use crate::catalog::factory::{create_services, LibraryServices};
    use crate::core::cache::CacheLayer;
    use crate::core::cache::local_cache::LocalCache;
    use crate::core::domain::AuthorDeletePolicy;
    use crate::core::library::LibraryError;
    use crate::core::repository::memory_repository::MemoryRepository;

    struct Fixture {
        services: LibraryServices,
        book_repo: Arc<MemoryRepository<BookEntity>>,
        cache: Arc<LocalCache>,
    }

    fn build() -> Fixture {
        let book_repo = Arc::new(MemoryRepository::<BookEntity>::new());
        let author_repo = Arc::new(MemoryRepository::<AuthorEntity>::new());
        let cache = Arc::new(LocalCache::new());
        let services = create_services(book_repo.clone(), author_repo, cache.clone(), AuthorDeletePolicy::Orphan);
        Fixture { services, book_repo, cache }
    }

    async fn add_sample_books(books: &Arc<dyn BookService>) {
        let _ = books.save(&BookEntity::new("Book1", "ISBN1", BigDecimal::from(2500), None)).await.expect("should save book");
        let _ = books.save(&BookEntity::new("Book2", "ISBN2", BigDecimal::from(370), None)).await.expect("should save book");
    }

    #[tokio::test]
    async fn test_should_page_sample_books() {
        let fixture = build();
        add_sample_books(&fixture.services.books).await;
        let page = fixture.services.books.find_all_pageable(0, 10).await.expect("should page books");
        assert_eq!(2, page.total_elements);
        assert_eq!(1, page.total_pages);
        assert_eq!(vec![Some(1), Some(2)], page.items.iter().map(|b| b.id).collect::<Vec<_>>());
        assert_eq!(BigDecimal::from(2500), page.items[0].price);
    }

    #[tokio::test]
    async fn test_should_find_by_isbn_and_title() {
        let fixture = build();
        add_sample_books(&fixture.services.books).await;
        let book = fixture.services.books.find_by_isbn("ISBN1").await.expect("should find book");
        assert_eq!(Some(1), book.id);
        let book = fixture.services.books.find_by_title("Book2").await.expect("should find book");
        assert_eq!(Some(2), book.id);
        match fixture.services.books.find_by_isbn("NOPE").await {
            Err(LibraryError::NotFound { message }) => assert_eq!("Book with isbn: NOPE not found.", message),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(fixture.services.books.find_by_title("Nope").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_cache_isbn_lookup_until_next_write() {
        let fixture = build();
        add_sample_books(&fixture.services.books).await;
        let _ = fixture.services.books.find_by_isbn("ISBN1").await.expect("should find book");
        let loads = fixture.book_repo.loads();
        let _ = fixture.services.books.find_by_isbn("ISBN1").await.expect("should find book");
        assert_eq!(loads, fixture.book_repo.loads());
        assert!(fixture.cache.get("book:isbn:ISBN1").await.expect("should get").is_some());

        let mut book = fixture.services.books.find_by_id(1).await.expect("should find book");
        book.isbn = "ISBN9".to_string();
        let _ = fixture.services.books.save(&book).await.expect("should update book");
        assert!(fixture.cache.get("book:isbn:ISBN1").await.expect("should get").is_none());
        assert!(matches!(fixture.services.books.find_by_isbn("ISBN1").await, Err(LibraryError::NotFound { .. })));
        let moved = fixture.services.books.find_by_isbn("ISBN9").await.expect("should find book");
        assert_eq!(Some(1), moved.id);
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_isbn() {
        let fixture = build();
        add_sample_books(&fixture.services.books).await;
        let res = fixture.services.books.save(&BookEntity::new("Copy", "ISBN1", BigDecimal::from(1), None)).await;
        assert!(matches!(res, Err(LibraryError::Conflict { .. })));
        let original = fixture.services.books.find_by_id(1).await.expect("should find book");
        assert_eq!("Book1", original.title);
        assert_eq!(2, fixture.services.books.find_all().await.expect("should list books").len());
    }

    #[tokio::test]
    async fn test_should_validate_books() {
        let fixture = build();
        let res = fixture.services.books.save(&BookEntity::new("Cheap", "ISBN1", BigDecimal::from(-1), None)).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let res = fixture.services.books.save(&BookEntity::new(" ", "ISBN1", BigDecimal::from(1), None)).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let res = fixture.services.books.save(&BookEntity::new("Title", "", BigDecimal::from(1), None)).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let free = fixture.services.books.save(&BookEntity::new("Free", "ISBN0", BigDecimal::from(0), None)).await;
        assert!(free.is_ok());
    }

    #[tokio::test]
    async fn test_should_require_existing_author() {
        let fixture = build();
        let res = fixture.services.books.save(&BookEntity::new("Orphan", "ISBN1", BigDecimal::from(1), Some(5))).await;
        match res {
            Err(LibraryError::NotFound { message }) => assert_eq!("Author with id: 5 not found.", message),
            other => panic!("unexpected {:?}", other),
        }
        assert!(fixture.services.books.find_all().await.expect("should list books").is_empty());

        let author = fixture.services.authors.save(&AuthorEntity::new(
            "Jane", "Austen", NaiveDate::from_ymd_opt(1775, 12, 16), "United Kingdom")).await.expect("should save author");
        let book = fixture.services.books.save(&BookEntity::new("Emma", "ISBN1", BigDecimal::from(1), author.id))
            .await.expect("should save book");
        assert_eq!(author.id, book.author_id);
        let books = fixture.services.books.find_by_author(author.id.expect("should have id")).await.expect("should find books");
        assert_eq!(1, books.len());
    }

    #[tokio::test]
    async fn test_should_delete_books() {
        let fixture = build();
        add_sample_books(&fixture.services.books).await;
        fixture.services.books.delete_by_id(2).await.expect("should delete book");
        assert!(matches!(fixture.services.books.delete_by_id(2).await, Err(LibraryError::NotFound { .. })));
        assert!(matches!(fixture.services.books.find_by_isbn("ISBN2").await, Err(LibraryError::NotFound { .. })));
        assert_eq!(1, fixture.services.books.find_all_pageable(0, 10).await.expect("should page books").total_elements);
    }
}
