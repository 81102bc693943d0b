use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use crate::authors::command::add_author_cmd::{AddAuthorCommand, AddAuthorCommandRequest, AddAuthorCommandResponse};
use crate::authors::command::get_author_cmd::{GetAuthorCommand, GetAuthorCommandRequest, GetAuthorCommandResponse};
use crate::authors::command::list_authors_cmd::{ListAuthorsCommand, ListAuthorsCommandRequest, ListAuthorsCommandResponse};
use crate::authors::command::remove_author_cmd::{RemoveAuthorCommand, RemoveAuthorCommandRequest, RemoveAuthorCommandResponse};
use crate::authors::command::update_author_cmd::{UpdateAuthorCommand, UpdateAuthorCommandRequest, UpdateAuthorCommandResponse};
use crate::authors::dto::AuthorPayload;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, PageParams, parse_id, ServerError};

pub async fn list_authors(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>) -> Result<Json<ListAuthorsCommandResponse>, ServerError> {
    let Query(params) = params?;
    let (page_number, page_size) = params.resolve()?;
    let req = ListAuthorsCommandRequest { page_number, page_size };
    let res = ListAuthorsCommand::new(state.authors.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_author_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<GetAuthorCommandResponse>, ServerError> {
    let req = GetAuthorCommandRequest { id: parse_id(id.as_str())? };
    let res = GetAuthorCommand::new(state.authors.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn add_author(
    State(state): State<AppState>,
    json: Result<Json<Value>, JsonRejection>) -> Result<(StatusCode, Json<AddAuthorCommandResponse>), ServerError> {
    let req: AddAuthorCommandRequest = serde_json::from_value(json?.0).map_err(json_to_server_error)?;
    let res = AddAuthorCommand::new(state.authors.clone()).execute(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    json: Result<Json<Value>, JsonRejection>) -> Result<Json<UpdateAuthorCommandResponse>, ServerError> {
    let author: AuthorPayload = serde_json::from_value(json?.0).map_err(json_to_server_error)?;
    let req = UpdateAuthorCommandRequest { id: parse_id(id.as_str())?, author };
    let res = UpdateAuthorCommand::new(state.authors.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn remove_author(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<RemoveAuthorCommandResponse>, ServerError> {
    let req = RemoveAuthorCommandRequest { id: parse_id(id.as_str())? };
    let res = RemoveAuthorCommand::new(state.authors.clone()).execute(req).await?;
    Ok(Json(res))
}
