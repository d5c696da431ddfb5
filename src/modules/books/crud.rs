//! Book persistence operations. Every function runs inside the caller's
//! [`Session`]; absence is reported as `None`/`false`, never as an error.

use bookstore_db::{DbError, Session};
use chrono::Utc;

use super::models::Book;
use super::schemas::{BookCreate, BookUpdate, Page};

async fn fetch(session: &mut Session, id: i64) -> Result<Option<Book>, DbError> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM book WHERE id = ?")
        .bind(id)
        .fetch_optional(session.conn().await?)
        .await?;
    Ok(book)
}

/// Insert a book, commit, and return the stored row with its assigned id.
#[tracing::instrument(skip(session, payload), fields(session = %session.id()))]
pub async fn create_book(session: &mut Session, payload: BookCreate) -> Result<Book, DbError> {
    let now = Utc::now();
    let BookCreate {
        title,
        author,
        year,
        price,
        in_stock,
        description,
    } = payload;

    let inserted = sqlx::query(
        r#"INSERT INTO book (title, author, year, price, in_stock, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(title)
    .bind(author)
    .bind(year)
    .bind(price)
    .bind(in_stock)
    .bind(description)
    .bind(now)
    .bind(now)
    .execute(session.conn().await?)
    .await?;

    let id = inserted.last_insert_rowid();
    let book = fetch(session, id)
        .await?
        .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
    session.commit().await?;

    tracing::info!(book_id = book.id, "book created");
    Ok(book)
}

/// Point lookup by primary key.
#[tracing::instrument(skip(session), fields(session = %session.id()))]
pub async fn get_book(session: &mut Session, id: i64) -> Result<Option<Book>, DbError> {
    fetch(session, id).await
}

/// One page of books ordered by id. No total count is computed.
#[tracing::instrument(skip(session), fields(session = %session.id()))]
pub async fn list_books(session: &mut Session, page: Page) -> Result<Vec<Book>, DbError> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM book ORDER BY id LIMIT ? OFFSET ?")
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(session.conn().await?)
        .await?;
    Ok(books)
}

/// Merge the present fields of `changes` into the stored book and commit.
/// `updated_at` advances even when nothing else changes.
#[tracing::instrument(skip(session, changes), fields(session = %session.id()))]
pub async fn update_book(
    session: &mut Session,
    id: i64,
    changes: BookUpdate,
) -> Result<Option<Book>, DbError> {
    let Some(mut book) = fetch(session, id).await? else {
        return Ok(None);
    };

    changes.apply(&mut book);
    book.touch();

    sqlx::query(
        r#"UPDATE book
        SET title = ?, author = ?, year = ?, price = ?, in_stock = ?, description = ?, updated_at = ?
        WHERE id = ?"#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.year)
    .bind(book.price)
    .bind(book.in_stock)
    .bind(&book.description)
    .bind(book.updated_at)
    .bind(book.id)
    .execute(session.conn().await?)
    .await?;

    let book = fetch(session, id)
        .await?
        .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
    session.commit().await?;

    tracing::info!(book_id = book.id, "book updated");
    Ok(Some(book))
}

/// Remove a book permanently. Returns `false` when no such row existed.
#[tracing::instrument(skip(session), fields(session = %session.id()))]
pub async fn delete_book(session: &mut Session, id: i64) -> Result<bool, DbError> {
    let deleted = sqlx::query("DELETE FROM book WHERE id = ?")
        .bind(id)
        .execute(session.conn().await?)
        .await?
        .rows_affected()
        > 0;

    if deleted {
        session.commit().await?;
        tracing::info!(book_id = id, "book deleted");
    }
    Ok(deleted)
}
