pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub trait BookService: Sync + Send {
    async fn find_by_id(&self, id: i64) -> LibraryResult<BookEntity>;
    async fn find_all(&self) -> LibraryResult<Vec<BookEntity>>;
    async fn find_all_pageable(&self, page_number: usize, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>>;
    async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<BookEntity>;
    async fn find_by_title(&self, title: &str) -> LibraryResult<BookEntity>;
    async fn find_by_author(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>>;
    async fn save(&self, book: &BookEntity) -> LibraryResult<BookEntity>;
    async fn delete_by_id(&self, id: i64) -> LibraryResult<()>;
}
