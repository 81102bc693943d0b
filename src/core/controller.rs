use std::sync::Arc;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use crate::authors::domain::AuthorService;
use crate::books::domain::BookService;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::security::{API_KEY_HEADER, ApiKeys, AuthorizationPolicy};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
// larger requested page sizes are clamped to this
pub const MAX_PAGE_SIZE: i64 = 2000;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub policy: Arc<AuthorizationPolicy>,
    pub api_keys: Arc<ApiKeys>,
    pub books: Arc<dyn BookService>,
    pub authors: Arc<dyn AuthorService>,
}

impl AppState {
    pub fn new(config: Configuration, books: Arc<dyn BookService>, authors: Arc<dyn AuthorService>) -> AppState {
        AppState {
            policy: Arc::new(AuthorizationPolicy::for_policy(config.security)),
            api_keys: Arc::new(ApiKeys::from_config(&config)),
            config: Arc::new(config),
            books,
            authors,
        }
    }
}

// JSON body of every failed request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug)]
pub struct ServerError {
    pub status: StatusCode,
    pub message: String,
}

impl ServerError {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self { status, message: message.to_string() }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        } else {
            warn!(status = %self.status, message = %self.message, "request rejected");
        }
        let body = ErrorResponse {
            status: self.status.as_u16(),
            message: self.message,
            timestamp: Utc::now().to_rfc3339(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    ServerError::new(StatusCode::BAD_REQUEST, format!("{}", err).as_str())
}

// extractor failures answer with the same JSON body as every other error
impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::new(rejection.status(), rejection.body_text().as_str())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::new(rejection.status(), rejection.body_text().as_str())
    }
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::Access { .. } => StatusCode::FORBIDDEN,
            CommandError::Conflict { .. } => StatusCode::CONFLICT,
            CommandError::NotFound { .. } => StatusCode::NOT_FOUND,
            CommandError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CommandError::Runtime { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CommandError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CommandError::Validation { .. } => StatusCode::BAD_REQUEST,
        };
        ServerError::new(status, err.to_string().as_str())
    }
}

impl From<LibraryError> for ServerError {
    fn from(err: LibraryError) -> Self {
        ServerError::from(CommandError::from(err))
    }
}

pub fn parse_id(id: &str) -> Result<i64, ServerError> {
    id.parse::<i64>().map_err(|_| ServerError::new(
        StatusCode::BAD_REQUEST, format!("invalid id: {}", id).as_str()))
}

// Query parameters of paged listings, zero-based
#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self) -> LibraryResult<(usize, usize)> {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 0 {
            return Err(LibraryError::validation("page must not be negative", Some("page".to_string())));
        }
        if size < 1 {
            return Err(LibraryError::validation("page size must not be less than one", Some("size".to_string())));
        }
        Ok((page as usize, size.min(MAX_PAGE_SIZE) as usize))
    }
}

/// Middleware: resolves the caller from the X-API-Key header and checks the
/// authorization table before any handler runs.
pub async fn authorize<B>(
    State(state): State<AppState>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    let principal = state.api_keys.resolve(key);
    let decision = state.policy.authorize(req.method(), req.uri().path(), principal);
    match decision {
        Ok(()) => next.run(req).await,
        Err(err) => ServerError::from(err).into_response(),
    }
}
