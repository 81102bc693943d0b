use async_trait::async_trait;
use tracing::{info, instrument};
use crate::authors::domain::AuthorService;
use crate::authors::domain::model::AuthorEntity;
use crate::books::domain::model::BookEntity;
use crate::books::domain::service::BookEntityService;
use crate::books::repository::BookRepository;
use crate::core::domain::{AuthorDeletePolicy, Entity};
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::EntityStore;
use crate::core::service::EntityService;

pub type AuthorEntityService = EntityService<AuthorEntity, dyn EntityStore<AuthorEntity>>;

pub struct AuthorServiceImpl {
    authors: AuthorEntityService,
    books: BookEntityService,
    delete_policy: AuthorDeletePolicy,
}

impl AuthorServiceImpl {
    pub fn new(authors: AuthorEntityService, books: BookEntityService, delete_policy: AuthorDeletePolicy) -> Self {
        Self {
            authors,
            books,
            delete_policy,
        }
    }

    fn validate(author: &AuthorEntity) -> LibraryResult<()> {
        if author.firstname.trim().is_empty() {
            return Err(LibraryError::validation("author firstname must not be empty", Some("firstname".to_string())));
        }
        if author.lastname.trim().is_empty() {
            return Err(LibraryError::validation("author lastname must not be empty", Some("lastname".to_string())));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorService for AuthorServiceImpl {
    async fn find_by_id(&self, id: i64) -> LibraryResult<AuthorEntity> {
        self.authors.find_by_id(id).await
    }

    async fn find_all(&self) -> LibraryResult<Vec<AuthorEntity>> {
        self.authors.find_all().await
    }

    async fn find_all_pageable(&self, page_number: usize, page_size: usize) -> LibraryResult<PaginatedResult<AuthorEntity>> {
        self.authors.find_all_pageable(page_number, page_size).await
    }

    async fn find_books(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>> {
        self.books.store().find_by_author_id(author_id).await
    }

    #[instrument(skip(self, author), fields(lastname = %author.lastname))]
    async fn save(&self, author: &AuthorEntity) -> LibraryResult<AuthorEntity> {
        Self::validate(author)?;
        self.authors.save(author).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> LibraryResult<()> {
        if !self.authors.store().exists_by_id(id).await? {
            return Err(LibraryError::entity_not_found(AuthorEntity::LABEL, "id", &id));
        }
        let books = self.find_books(id).await?;
        match self.delete_policy {
            AuthorDeletePolicy::Reject if !books.is_empty() => {
                return Err(LibraryError::conflict(
                    format!("Author with id: {} still has {} books.", id, books.len()).as_str()));
            }
            AuthorDeletePolicy::Cascade => {
                for book in &books {
                    if let Some(book_id) = book.id {
                        self.books.delete_by_id(book_id).await?;
                    }
                }
                info!(author_id = id, books = books.len(), "deleted books of author");
            }
            AuthorDeletePolicy::Orphan => {
                for book in books {
                    let mut orphan = book;
                    orphan.author_id = None;
                    let _ = self.books.save(&orphan).await?;
                }
            }
            AuthorDeletePolicy::Reject => {}
        }
        self.authors.delete_by_id(id).await
    }
}
