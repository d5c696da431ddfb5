//! HTTP handlers for the books module, mounted under `/api/v1/books`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_db::Database;
use bookstore_http::error::{AppError, AppResult, ErrorResponse};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use super::crud;
use super::schemas::{BookCreate, BookRead, BookUpdate, Page};

const NOT_FOUND: &str = "Book not found";

/// Build the module router; every handler shares the pool handle.
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .with_state(db)
}

fn invalid(errors: ValidationErrors) -> AppError {
    let details = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |e| json!({ "field": field, "error": e.code }))
        })
        .collect();
    AppError::validation(details, "request parameters are invalid")
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = BookCreate,
    responses(
        (status = 201, description = "Book created", body = BookRead),
        (status = 422, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(db): State<Database>,
    payload: Result<Json<BookCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BookRead>)> {
    let Json(payload) = payload?;
    let book = db
        .scoped_write(|session| Box::pin(crud::create_book(session, payload)))
        .await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// List a page of books
#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    params(Page),
    responses(
        (status = 200, description = "Page of books ordered by id", body = [BookRead]),
        (status = 422, description = "Invalid pagination", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(db): State<Database>,
    page: Result<Query<Page>, QueryRejection>,
) -> AppResult<Json<Vec<BookRead>>> {
    let Query(page) = page?;
    page.validate().map_err(invalid)?;

    let books = db
        .scoped(|session| Box::pin(crud::list_books(session, page)))
        .await?;
    tracing::debug!(count = books.len(), offset = page.offset, "listed books");
    Ok(Json(books.into_iter().map(BookRead::from).collect()))
}

/// Get a single book by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = BookRead),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<BookRead>> {
    let Path(id) = id?;
    let book = db
        .scoped(|session| Box::pin(crud::get_book(session, id)))
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(Json(book.into()))
}

/// Partially update a book; absent fields keep their stored values
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Updated book", body = BookRead),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 422, description = "Invalid payload", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookUpdate>, JsonRejection>,
) -> AppResult<Json<BookRead>> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    tracing::debug!(book_id = id, empty = changes.is_empty(), "applying book update");
    let book = db
        .scoped_write(|session| Box::pin(crud::update_book(session, id, changes)))
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(Json(book.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    let deleted = db
        .scoped_write(|session| Box::pin(crud::delete_book(session, id)))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(NOT_FOUND))
    }
}
