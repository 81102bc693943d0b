use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::LibraryResult;
use crate::core::repository::EntityStore;
use crate::core::repository::ddb_repository::DDBRepository;

pub const BOOKS_TABLE: &str = "books";

#[async_trait]
impl BookRepository for DDBRepository<BookEntity> {
    // author_id is not indexed so the collection is filtered after a full scan
    async fn find_by_author_id(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>> {
        let all = self.get_all().await?;
        Ok(all.into_iter().filter(|b| b.author_id == Some(author_id)).collect())
    }
}
