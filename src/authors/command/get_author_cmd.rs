use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::domain::AuthorService;
use crate::authors::dto::AuthorDto;
use crate::books::dto::BookDto;
use crate::core::command::{Command, CommandError};

pub struct GetAuthorCommand {
    author_service: Arc<dyn AuthorService>,
}

impl GetAuthorCommand {
    pub fn new(author_service: Arc<dyn AuthorService>) -> Self {
        Self {
            author_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetAuthorCommandRequest {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct GetAuthorCommandResponse {
    #[serde(flatten)]
    pub author: AuthorDto,
}

#[async_trait]
impl Command<GetAuthorCommandRequest, GetAuthorCommandResponse> for GetAuthorCommand {
    async fn execute(&self, req: GetAuthorCommandRequest) -> Result<GetAuthorCommandResponse, CommandError> {
        let author = self.author_service.find_by_id(req.id).await?;
        let books = self.author_service.find_books(req.id).await?;
        let author = AuthorDto::from(author).with_books(books.into_iter().map(BookDto::from).collect());
        Ok(GetAuthorCommandResponse { author })
    }
}
