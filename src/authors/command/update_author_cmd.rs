use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::domain::AuthorService;
use crate::authors::dto::{AuthorDto, AuthorPayload};
use crate::core::command::{Command, CommandError};

pub struct UpdateAuthorCommand {
    author_service: Arc<dyn AuthorService>,
}

impl UpdateAuthorCommand {
    pub fn new(author_service: Arc<dyn AuthorService>) -> Self {
        Self {
            author_service,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAuthorCommandRequest {
    pub id: i64,
    pub author: AuthorPayload,
}

#[derive(Debug, Serialize)]
pub struct UpdateAuthorCommandResponse {
    #[serde(flatten)]
    pub author: AuthorDto,
}

#[async_trait]
impl Command<UpdateAuthorCommandRequest, UpdateAuthorCommandResponse> for UpdateAuthorCommand {
    async fn execute(&self, req: UpdateAuthorCommandRequest) -> Result<UpdateAuthorCommandResponse, CommandError> {
        let _ = self.author_service.find_by_id(req.id).await?;
        let author = req.author.build_author(Some(req.id));
        self.author_service.save(&author).await
            .map_err(CommandError::from)
            .map(|saved| UpdateAuthorCommandResponse { author: AuthorDto::from(saved) })
    }
}
