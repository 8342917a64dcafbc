//! HTTP handlers for the books resource.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;
use serde_json::Value;

use super::models::{BookList, BookResponse, Message};
use super::service::BookService;

type Shared = State<Arc<BookService>>;

/// Routes relative to the module mount point (`/books` by default).
pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

/// Unwrap a JSON body, turning parse failures into the standard error shape.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let Json(value) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    if !value.is_object() {
        return Err(AppError::bad_request("request body must be a JSON object"));
    }
    Ok(value)
}

async fn list_books(State(service): Shared) -> Result<Json<BookList>, AppError> {
    let books = service.list().await?;
    Ok(Json(BookList { books }))
}

async fn get_book(
    State(service): Shared,
    Path(isbn): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.get(&isbn).await?;
    Ok(Json(BookResponse { book }))
}

async fn create_book(
    State(service): Shared,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let book = service.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(BookResponse { book })))
}

async fn update_book(
    State(service): Shared,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let book = service.update(&isbn, json_body(payload)?).await?;
    Ok(Json(BookResponse { book }))
}

async fn delete_book(
    State(service): Shared,
    Path(isbn): Path<String>,
) -> Result<Json<Message>, AppError> {
    service.delete(&isbn).await?;
    Ok(Json(Message {
        message: "Book deleted".to_string(),
    }))
}

async fn health_check(State(service): Shared) -> Result<&'static str, AppError> {
    service.health().await?;
    Ok("books module is healthy")
}
