pub mod ddb_book_repository;
pub mod memory_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::EntityStore;

#[async_trait]
pub trait BookRepository: EntityStore<BookEntity> {
    // books referencing the author in id order
    async fn find_by_author_id(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>>;
}
