use chrono::Utc;
use sqlx::{FromRow, PgPool, Result};
use tracing::warn;
use uuid::Uuid;

use crate::db::enums::TagKind;
use crate::db::models::{Book, BookInput};
use crate::db::services::tag_service;

// --- Book Service Functions ---

/// Retrieves all books, newest first, each with its tag names.
/// Rows that fail to decode are skipped rather than failing the whole list.
pub async fn list_books(pool: &PgPool) -> Result<Vec<Book>> {
    let rows = sqlx::query(
        r#"
        SELECT id, cover_image_url, title, author, isbn, rating, created_at
        FROM books
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut conn = pool.acquire().await?;
    let mut books = Vec::with_capacity(rows.len());
    for row in rows {
        let mut book = match Book::from_row(&row) {
            Ok(book) => book,
            Err(e) => {
                warn!(error = %e, "Skipping book row that could not be decoded.");
                continue;
            }
        };
        book.tags = tag_service::tag_names_for(&mut conn, TagKind::Book, book.id).await?;
        books.push(book);
    }
    Ok(books)
}

/// Retrieves a single book with its tags.
pub async fn get_book(pool: &PgPool, book_id: Uuid) -> Result<Option<Book>> {
    let mut conn = pool.acquire().await?;
    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, cover_image_url, title, author, isbn, rating, created_at
        FROM books
        WHERE id = $1
        "#,
    )
    .bind(book_id)
    .fetch_optional(&mut *conn)
    .await?;

    match book {
        Some(mut book) => {
            book.tags = tag_service::tag_names_for(&mut conn, TagKind::Book, book.id).await?;
            Ok(Some(book))
        }
        None => Ok(None),
    }
}

/// Creates a book and links its tags in a single transaction.
pub async fn create_book(pool: &PgPool, input: &BookInput) -> Result<Book> {
    let mut tx = pool.begin().await?;

    let mut book = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (id, cover_image_url, title, author, isbn, rating, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, cover_image_url, title, author, isbn, rating, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.cover_image_url)
    .bind(&input.title)
    .bind(&input.author)
    .bind(&input.isbn)
    .bind(input.rating)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tag_service::attach_tags(&mut tx, TagKind::Book, book.id, &input.tags).await?;
    book.tags = tag_service::tag_names_for(&mut tx, TagKind::Book, book.id).await?;

    tx.commit().await?;
    Ok(book)
}

/// Overwrites a book's fields and replaces its tag set.
/// Returns `None` without writing anything if the book does not exist.
pub async fn update_book(pool: &PgPool, book_id: Uuid, input: &BookInput) -> Result<Option<Book>> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Book>(
        r#"
        UPDATE books
        SET cover_image_url = $1, title = $2, author = $3, isbn = $4, rating = $5
        WHERE id = $6
        RETURNING id, cover_image_url, title, author, isbn, rating, created_at
        "#,
    )
    .bind(&input.cover_image_url)
    .bind(&input.title)
    .bind(&input.author)
    .bind(&input.isbn)
    .bind(input.rating)
    .bind(book_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut book) = updated else {
        return Ok(None);
    };

    tag_service::unlink_all_tags(&mut tx, TagKind::Book, book_id).await?;
    tag_service::attach_tags(&mut tx, TagKind::Book, book_id, &input.tags).await?;
    book.tags = tag_service::tag_names_for(&mut tx, TagKind::Book, book_id).await?;

    tx.commit().await?;
    Ok(Some(book))
}

/// Deletes a book's tag links and then the book itself.
/// Returns `false` if no book row was deleted; the transaction is rolled back in that case.
pub async fn delete_book(pool: &PgPool, book_id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    tag_service::unlink_all_tags(&mut tx, TagKind::Book, book_id).await?;

    let rows_affected = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}
