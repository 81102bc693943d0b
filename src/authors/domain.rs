pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::authors::domain::model::AuthorEntity;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub trait AuthorService: Sync + Send {
    async fn find_by_id(&self, id: i64) -> LibraryResult<AuthorEntity>;
    async fn find_all(&self) -> LibraryResult<Vec<AuthorEntity>>;
    async fn find_all_pageable(&self, page_number: usize, page_size: usize) -> LibraryResult<PaginatedResult<AuthorEntity>>;
    async fn find_books(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>>;
    async fn save(&self, author: &AuthorEntity) -> LibraryResult<AuthorEntity>;
    // applies the configured delete policy to the books of the author
    async fn delete_by_id(&self, id: i64) -> LibraryResult<()>;
}
