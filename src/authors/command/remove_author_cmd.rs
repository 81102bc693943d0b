use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::domain::AuthorService;
use crate::core::command::{Command, CommandError};

pub struct RemoveAuthorCommand {
    author_service: Arc<dyn AuthorService>,
}

impl RemoveAuthorCommand {
    pub fn new(author_service: Arc<dyn AuthorService>) -> Self {
        Self {
            author_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveAuthorCommandRequest {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct RemoveAuthorCommandResponse {
    pub message: String,
}

#[async_trait]
impl Command<RemoveAuthorCommandRequest, RemoveAuthorCommandResponse> for RemoveAuthorCommand {
    async fn execute(&self, req: RemoveAuthorCommandRequest) -> Result<RemoveAuthorCommandResponse, CommandError> {
        self.author_service.delete_by_id(req.id).await
            .map_err(CommandError::from)
            .map(|_| RemoveAuthorCommandResponse { message: format!("Author with id: {} deleted.", req.id) })
    }
}
