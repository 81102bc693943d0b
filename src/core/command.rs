use async_trait::async_trait;
use thiserror::Error;
use crate::core::library::LibraryError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{message}")]
    Access {
        message: String,
        reason_code: Option<String>,
    },
    #[error("{message}")]
    Conflict {
        message: String,
    },
    #[error("{message}")]
    NotFound {
        message: String,
    },
    #[error("{message}")]
    Unavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    #[error("{message}")]
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
    #[error("{message}")]
    Serialization {
        message: String,
    },
    #[error("{message}")]
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::Conflict { message } => {
                CommandError::Conflict { message }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::AccessDenied { message, reason_code } => {
                CommandError::Access { message, reason_code }
            }
            LibraryError::Unavailable { message, reason_code, retryable } => {
                CommandError::Unavailable { message, reason_code, retryable }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code }
            }
        }
    }
}
