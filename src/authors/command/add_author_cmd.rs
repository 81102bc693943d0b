use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use crate::authors::domain::AuthorService;
use crate::authors::dto::{AuthorDto, AuthorPayload};
use crate::core::command::{Command, CommandError};

pub struct AddAuthorCommand {
    author_service: Arc<dyn AuthorService>,
}

impl AddAuthorCommand {
    pub fn new(author_service: Arc<dyn AuthorService>) -> Self {
        Self {
            author_service,
        }
    }
}

pub type AddAuthorCommandRequest = AuthorPayload;

#[derive(Debug, Serialize)]
pub struct AddAuthorCommandResponse {
    #[serde(flatten)]
    pub author: AuthorDto,
}

#[async_trait]
impl Command<AddAuthorCommandRequest, AddAuthorCommandResponse> for AddAuthorCommand {
    async fn execute(&self, req: AddAuthorCommandRequest) -> Result<AddAuthorCommandResponse, CommandError> {
        let author = req.build_author(None);
        self.author_service.save(&author).await
            .map_err(CommandError::from)
            .map(|saved| AddAuthorCommandResponse { author: AuthorDto::from(saved) })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::authors::command::add_author_cmd::{AddAuthorCommand, AddAuthorCommandRequest};
    use crate::catalog::factory::create_memory_services;
    use crate::core::command::Command;
    use crate::core::domain::AuthorDeletePolicy;

    #[tokio::test]
    async fn test_should_run_add_author() {
        let services = create_memory_services(AuthorDeletePolicy::Orphan);
        let cmd = AddAuthorCommand::new(services.authors.clone());
        let res = cmd.execute(AddAuthorCommandRequest {
            firstname: "Jane".to_string(),
            lastname: "Austen".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1775, 12, 16),
            country: "United Kingdom".to_string(),
        }).await.expect("should add author");
        assert_eq!(1, res.author.id);
        assert!(res.author.books.is_none());
    }
}
