use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::domain::BookService;
use crate::books::dto::{BookDto, BookPayload};
use crate::core::command::{Command, CommandError};

pub struct UpdateBookCommand {
    book_service: Arc<dyn BookService>,
}

impl UpdateBookCommand {
    pub fn new(book_service: Arc<dyn BookService>) -> Self {
        Self {
            book_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBookCommandRequest {
    pub id: i64,
    pub book: BookPayload,
}

#[derive(Debug, Serialize)]
pub struct UpdateBookCommandResponse {
    #[serde(flatten)]
    pub book: BookDto,
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        // updating an unknown id is rejected here instead of inserting a new record
        let _ = self.book_service.find_by_id(req.id).await?;
        let book = req.book.build_book(Some(req.id));
        self.book_service.save(&book).await
            .map_err(CommandError::from)
            .map(|saved| UpdateBookCommandResponse { book: BookDto::from(saved) })
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use crate::books::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest};
    use crate::books::domain::model::BookEntity;
    use crate::books::dto::BookPayload;
    use crate::catalog::factory::create_memory_services;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::AuthorDeletePolicy;

    fn payload(title: &str, isbn: &str) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            isbn: isbn.to_string(),
            price: BigDecimal::from(99),
            author_id: None,
        }
    }

    #[tokio::test]
    async fn test_should_run_update_book() {
        let services = create_memory_services(AuthorDeletePolicy::Orphan);
        let saved = services.books.save(&BookEntity::new("Book1", "ISBN1", BigDecimal::from(1), None))
            .await.expect("should save book");
        let cmd = UpdateBookCommand::new(services.books.clone());
        let res = cmd.execute(UpdateBookCommandRequest { id: 1, book: payload("Renamed", "ISBN1") })
            .await.expect("should update book");
        assert_eq!("Renamed", res.book.title);
        assert_eq!(BigDecimal::from(99), res.book.price);
        assert_eq!(saved.audit.map(|a| a.created_at), res.book.created_at);
        let loaded = services.books.find_by_id(1).await.expect("should find book");
        assert_eq!("Renamed", loaded.title);
    }

    #[tokio::test]
    async fn test_should_not_update_unknown_book() {
        let services = create_memory_services(AuthorDeletePolicy::Orphan);
        let cmd = UpdateBookCommand::new(services.books.clone());
        let res = cmd.execute(UpdateBookCommandRequest { id: 4, book: payload("Ghost", "ISBN4") }).await;
        assert!(matches!(res, Err(CommandError::NotFound { .. })));
        assert!(services.books.find_all().await.expect("should list books").is_empty());
    }
}
