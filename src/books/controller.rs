use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use crate::books::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest, AddBookCommandResponse};
use crate::books::command::get_book_cmd::{GetBookCommand, GetBookCommandRequest, GetBookCommandResponse};
use crate::books::command::list_books_cmd::{ListBooksCommand, ListBooksCommandRequest, ListBooksCommandResponse};
use crate::books::command::remove_book_cmd::{RemoveBookCommand, RemoveBookCommandRequest, RemoveBookCommandResponse};
use crate::books::command::update_book_cmd::{UpdateBookCommand, UpdateBookCommandRequest, UpdateBookCommandResponse};
use crate::books::dto::BookPayload;
use crate::core::command::Command;
use crate::core::controller::{AppState, json_to_server_error, PageParams, parse_id, ServerError};
use crate::core::library::LibraryError;

#[derive(Debug, Deserialize, Default)]
pub struct BookLookupParams {
    pub title: Option<String>,
    pub isbn: Option<String>,
}

pub async fn list_books(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>) -> Result<Json<ListBooksCommandResponse>, ServerError> {
    let Query(params) = params?;
    let (page_number, page_size) = params.resolve()?;
    let req = ListBooksCommandRequest { page_number, page_size };
    let res = ListBooksCommand::new(state.books.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_book_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    let req = GetBookCommandRequest::ById(parse_id(id.as_str())?);
    let res = GetBookCommand::new(state.books.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn find_book_by_title(
    State(state): State<AppState>,
    params: Result<Query<BookLookupParams>, QueryRejection>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    let Query(params) = params?;
    let title = params.title.ok_or_else(|| LibraryError::validation("title is required", Some("title".to_string())))?;
    let res = GetBookCommand::new(state.books.clone()).execute(GetBookCommandRequest::ByTitle(title)).await?;
    Ok(Json(res))
}

pub async fn find_book_by_isbn(
    State(state): State<AppState>,
    params: Result<Query<BookLookupParams>, QueryRejection>) -> Result<Json<GetBookCommandResponse>, ServerError> {
    let Query(params) = params?;
    let isbn = params.isbn.ok_or_else(|| LibraryError::validation("isbn is required", Some("isbn".to_string())))?;
    let res = GetBookCommand::new(state.books.clone()).execute(GetBookCommandRequest::ByIsbn(isbn)).await?;
    Ok(Json(res))
}

pub async fn add_book(
    State(state): State<AppState>,
    json: Result<Json<Value>, JsonRejection>) -> Result<(StatusCode, Json<AddBookCommandResponse>), ServerError> {
    let req: AddBookCommandRequest = serde_json::from_value(json?.0).map_err(json_to_server_error)?;
    let res = AddBookCommand::new(state.books.clone()).execute(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    json: Result<Json<Value>, JsonRejection>) -> Result<Json<UpdateBookCommandResponse>, ServerError> {
    let book: BookPayload = serde_json::from_value(json?.0).map_err(json_to_server_error)?;
    let req = UpdateBookCommandRequest { id: parse_id(id.as_str())?, book };
    let res = UpdateBookCommand::new(state.books.clone()).execute(req).await?;
    Ok(Json(res))
}

pub async fn remove_book(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<RemoveBookCommandResponse>, ServerError> {
    let req = RemoveBookCommandRequest { id: parse_id(id.as_str())? };
    let res = RemoveBookCommand::new(state.books.clone()).execute(req).await?;
    Ok(Json(res))
}
