use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::domain::BookService;
use crate::books::dto::{BookDto, BookPayload};
use crate::core::command::{Command, CommandError};

pub struct AddBookCommand {
    book_service: Arc<dyn BookService>,
}

impl AddBookCommand {
    pub fn new(book_service: Arc<dyn BookService>) -> Self {
        Self {
            book_service,
        }
    }
}

pub type AddBookCommandRequest = BookPayload;

#[derive(Debug, Serialize)]
pub struct AddBookCommandResponse {
    #[serde(flatten)]
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let book = req.build_book(None);
        self.book_service.save(&book).await
            .map_err(CommandError::from)
            .map(|saved| AddBookCommandResponse::new(BookDto::from(saved)))
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use crate::books::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::factory::create_memory_services;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::AuthorDeletePolicy;

    fn request(title: &str, isbn: &str) -> AddBookCommandRequest {
        AddBookCommandRequest {
            title: title.to_string(),
            isbn: isbn.to_string(),
            price: BigDecimal::from(2500),
            author_id: None,
        }
    }

    #[tokio::test]
    async fn test_should_run_add_book() {
        let services = create_memory_services(AuthorDeletePolicy::Orphan);
        let cmd = AddBookCommand::new(services.books.clone());
        let res = cmd.execute(request("Book1", "ISBN1")).await.expect("should add book");
        assert_eq!(1, res.book.id);
        assert!(res.book.created_at.is_some());
    }

    #[tokio::test]
    async fn test_should_not_add_duplicate_isbn() {
        let services = create_memory_services(AuthorDeletePolicy::Orphan);
        let cmd = AddBookCommand::new(services.books.clone());
        let _ = cmd.execute(request("Book1", "ISBN1")).await.expect("should add book");
        let res = cmd.execute(request("Book2", "ISBN1")).await;
        assert!(matches!(res, Err(CommandError::Conflict { .. })));
    }
}
