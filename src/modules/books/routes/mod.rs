//! HTTP handlers for `/books`.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use bookshelf_http::error::AppError;

use super::models::{Book, CreateBook, Message, UpdateBook};
use super::service::{BookError, BookService, NOT_FOUND_MESSAGE};

/// Routes relative to the module mount point.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(errors) => AppError::validation(errors.to_string()),
            BookError::InvalidId(_) | BookError::NotFound => AppError::not_found(NOT_FOUND_MESSAGE),
            BookError::Store(e) => AppError::internal(e),
        }
    }
}

/// Write paths report store failures as client errors.
fn write_error(err: BookError) -> AppError {
    match err {
        BookError::Store(e) => AppError::bad_request(e.to_string()),
        other => other.into(),
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// Update payload; a missing, empty or non-JSON body is the empty subset.
fn update_body(headers: &HeaderMap, bytes: &[u8]) -> Result<UpdateBook, AppError> {
    if bytes.is_empty() || !is_json(headers) {
        return Ok(UpdateBook::default());
    }
    body(Json::from_bytes(bytes))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| {
            let essence = essence.trim();
            essence.eq_ignore_ascii_case("application/json") || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

async fn create_book(
    State(service): State<BookService>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = service.create(body(payload)?).await.map_err(write_error)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(&id).await?))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Bytes,
) -> Result<Json<Book>, AppError> {
    let book = service
        .update(&id, update_body(&headers, &payload)?)
        .await
        .map_err(write_error)?;
    Ok(Json(book))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    service.delete(&id).await?;
    Ok(Json(Message::new("Book deleted")))
}
