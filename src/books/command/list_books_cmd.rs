use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::books::domain::BookService;
use crate::books::dto::BookDto;
use crate::core::command::{Command, CommandError};
use crate::core::library::PaginatedResult;

pub struct ListBooksCommand {
    book_service: Arc<dyn BookService>,
}

impl ListBooksCommand {
    pub fn new(book_service: Arc<dyn BookService>) -> Self {
        Self {
            book_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListBooksCommandRequest {
    pub page_number: usize,
    pub page_size: usize,
}

#[derive(Debug, Serialize)]
pub struct ListBooksCommandResponse {
    #[serde(flatten)]
    pub page: PaginatedResult<BookDto>,
}

#[async_trait]
impl Command<ListBooksCommandRequest, ListBooksCommandResponse> for ListBooksCommand {
    async fn execute(&self, req: ListBooksCommandRequest) -> Result<ListBooksCommandResponse, CommandError> {
        self.book_service.find_all_pageable(req.page_number, req.page_size).await
            .map_err(CommandError::from)
            .map(|page| ListBooksCommandResponse { page: page.map(BookDto::from) })
    }
}
