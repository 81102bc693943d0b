use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::domain::AuthorService;
use crate::authors::dto::AuthorDto;
use crate::core::command::{Command, CommandError};
use crate::core::library::PaginatedResult;

pub struct ListAuthorsCommand {
    author_service: Arc<dyn AuthorService>,
}

impl ListAuthorsCommand {
    pub fn new(author_service: Arc<dyn AuthorService>) -> Self {
        Self {
            author_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListAuthorsCommandRequest {
    pub page_number: usize,
    pub page_size: usize,
}

#[derive(Debug, Serialize)]
pub struct ListAuthorsCommandResponse {
    #[serde(flatten)]
    pub page: PaginatedResult<AuthorDto>,
}

#[async_trait]
impl Command<ListAuthorsCommandRequest, ListAuthorsCommandResponse> for ListAuthorsCommand {
    async fn execute(&self, req: ListAuthorsCommandRequest) -> Result<ListAuthorsCommandResponse, CommandError> {
        self.author_service.find_all_pageable(req.page_number, req.page_size).await
            .map_err(CommandError::from)
            .map(|page| ListAuthorsCommandResponse { page: page.map(AuthorDto::from) })
    }
}
