use chrono::Utc;
use sqlx::{FromRow, PgPool, Result};
use tracing::warn;
use uuid::Uuid;

use crate::db::enums::TagKind;
use crate::db::models::{Film, FilmInput};
use crate::db::services::tag_service;

// --- Film Service Functions ---

/// Retrieves all films, newest first, each with its tag names.
pub async fn list_films(pool: &PgPool) -> Result<Vec<Film>> {
    let rows = sqlx::query(
        r#"
        SELECT id, poster_image_url, title, rating, created_at
        FROM films
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut conn = pool.acquire().await?;
    let mut films = Vec::with_capacity(rows.len());
    for row in rows {
        let mut film = match Film::from_row(&row) {
            Ok(film) => film,
            Err(e) => {
                warn!(error = %e, "Skipping film row that could not be decoded.");
                continue;
            }
        };
        film.tags = tag_service::tag_names_for(&mut conn, TagKind::Film, film.id).await?;
        films.push(film);
    }
    Ok(films)
}

pub async fn get_film(pool: &PgPool, film_id: Uuid) -> Result<Option<Film>> {
    let mut conn = pool.acquire().await?;
    let film = sqlx::query_as::<_, Film>(
        "SELECT id, poster_image_url, title, rating, created_at FROM films WHERE id = $1",
    )
    .bind(film_id)
    .fetch_optional(&mut *conn)
    .await?;

    match film {
        Some(mut film) => {
            film.tags = tag_service::tag_names_for(&mut conn, TagKind::Film, film.id).await?;
            Ok(Some(film))
        }
        None => Ok(None),
    }
}

/// Creates a film and links its tags in a single transaction.
pub async fn create_film(pool: &PgPool, input: &FilmInput) -> Result<Film> {
    let mut tx = pool.begin().await?;

    let mut film = sqlx::query_as::<_, Film>(
        r#"
        INSERT INTO films (id, poster_image_url, title, rating, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, poster_image_url, title, rating, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.poster_image_url)
    .bind(&input.title)
    .bind(input.rating)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tag_service::attach_tags(&mut tx, TagKind::Film, film.id, &input.tags).await?;
    film.tags = tag_service::tag_names_for(&mut tx, TagKind::Film, film.id).await?;

    tx.commit().await?;
    Ok(film)
}

/// Overwrites a film's fields and replaces its tag set.
pub async fn update_film(pool: &PgPool, film_id: Uuid, input: &FilmInput) -> Result<Option<Film>> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Film>(
        r#"
        UPDATE films
        SET poster_image_url = $1, title = $2, rating = $3
        WHERE id = $4
        RETURNING id, poster_image_url, title, rating, created_at
        "#,
    )
    .bind(&input.poster_image_url)
    .bind(&input.title)
    .bind(input.rating)
    .bind(film_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut film) = updated else {
        return Ok(None);
    };

    tag_service::unlink_all_tags(&mut tx, TagKind::Film, film_id).await?;
    tag_service::attach_tags(&mut tx, TagKind::Film, film_id, &input.tags).await?;
    film.tags = tag_service::tag_names_for(&mut tx, TagKind::Film, film_id).await?;

    tx.commit().await?;
    Ok(Some(film))
}

/// Deletes a film's tag links and then the film itself.
pub async fn delete_film(pool: &PgPool, film_id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    tag_service::unlink_all_tags(&mut tx, TagKind::Film, film_id).await?;

    let rows_affected = sqlx::query("DELETE FROM films WHERE id = $1")
        .bind(film_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}
