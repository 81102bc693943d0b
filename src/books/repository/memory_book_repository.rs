use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::LibraryResult;
use crate::core::repository::memory_repository::MemoryRepository;

#[async_trait]
impl BookRepository for MemoryRepository<BookEntity> {
    async fn find_by_author_id(&self, author_id: i64) -> LibraryResult<Vec<BookEntity>> {
        Ok(self.find_where(move |b: &BookEntity| b.author_id == Some(author_id)).await)
    }
}
