use std::net::SocketAddr;
use std::time::Duration;
use axum::{
    body::HttpBody,
    http::{header::{AUTHORIZATION, CONTENT_TYPE}, HeaderName, Method},
    middleware,
    response::Json,
    routing::get,
    BoxError, Router,
};
use lambda_http::{run, Error};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::authors::controller::{add_author, find_author_by_id, list_authors, remove_author, update_author};
use crate::books::controller::{add_book, find_book_by_id, find_book_by_isbn, find_book_by_title, list_books, remove_book, update_book};
use crate::catalog::factory::create_app_state;
use crate::core::controller::{authorize, AppState};
use crate::core::domain::Configuration;

// set by the Lambda runtime, absent when running as a plain HTTP server
const LAMBDA_RUNTIME_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

/// Builds the catalog router. Generic over the request body so the same
/// routes serve both hyper connections and API Gateway events.
pub fn build_router<B>(state: AppState) -> Router<(), B>
    where
        B: HttpBody + Send + 'static,
        B::Data: Send,
        B::Error: Into<BoxError>,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, HeaderName::from_static("x-api-key")])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health))
        .route("/v1/books", get(list_books).post(add_book))
        .route("/v1/books/by-title", get(find_book_by_title))
        .route("/v1/books/by-isbn", get(find_book_by_isbn))
        .route("/v1/books/:id",
               get(find_book_by_id).put(update_book).delete(remove_book))
        .route("/v1/authors", get(list_authors).post(add_author))
        .route("/v1/authors/:id",
               get(find_author_by_id).put(update_author).delete(remove_author))
        .layer(middleware::from_fn_with_state(state.clone(), authorize::<B>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: Configuration) -> Result<(), Error> {
    let bind_addr = config.bind_addr.clone();
    let state = create_app_state(config).await?;

    if std::env::var(LAMBDA_RUNTIME_ENV).is_ok() {
        info!("starting catalog lambda");
        return run(build_router::<lambda_http::Body>(state)).await;
    }

    let addr: SocketAddr = bind_addr.parse()?;
    info!(addr = %addr, "starting catalog server");
    axum::Server::bind(&addr)
        .serve(build_router::<axum::body::Body>(state).into_make_service())
        .await?;
    Ok(())
}
