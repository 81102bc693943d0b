use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::domain::BookService;
use crate::core::command::{Command, CommandError};

pub struct RemoveBookCommand {
    book_service: Arc<dyn BookService>,
}

impl RemoveBookCommand {
    pub fn new(book_service: Arc<dyn BookService>) -> Self {
        Self {
            book_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveBookCommandRequest {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveBookCommandResponse {
    pub message: String,
}

#[async_trait]
impl Command<RemoveBookCommandRequest, RemoveBookCommandResponse> for RemoveBookCommand {
    async fn execute(&self, req: RemoveBookCommandRequest) -> Result<RemoveBookCommandResponse, CommandError> {
        self.book_service.delete_by_id(req.id).await
            .map_err(CommandError::from)
            .map(|_| RemoveBookCommandResponse { message: format!("Book with id: {} deleted.", req.id) })
    }
}
