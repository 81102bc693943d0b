use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::domain::BookService;
use crate::books::dto::BookDto;
use crate::core::command::{Command, CommandError};

pub struct GetBookCommand {
    book_service: Arc<dyn BookService>,
}

impl GetBookCommand {
    pub fn new(book_service: Arc<dyn BookService>) -> Self {
        Self {
            book_service,
        }
    }
}

// A book can be looked up by id or by exact isbn or title
#[derive(Debug, Clone, PartialEq)]
pub enum GetBookCommandRequest {
    ById(i64),
    ByIsbn(String),
    ByTitle(String),
}

#[derive(Debug, Serialize)]
pub struct GetBookCommandResponse {
    #[serde(flatten)]
    pub book: BookDto,
}

impl GetBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<GetBookCommandRequest, GetBookCommandResponse> for GetBookCommand {
    async fn execute(&self, req: GetBookCommandRequest) -> Result<GetBookCommandResponse, CommandError> {
        let res = match req {
            GetBookCommandRequest::ById(id) => self.book_service.find_by_id(id).await,
            GetBookCommandRequest::ByIsbn(isbn) => self.book_service.find_by_isbn(isbn.as_str()).await,
            GetBookCommandRequest::ByTitle(title) => self.book_service.find_by_title(title.as_str()).await,
        };
        res.map_err(CommandError::from).map(|book| GetBookCommandResponse::new(BookDto::from(book)))
    }
}
