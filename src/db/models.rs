use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the catalog owner.
/// Corresponds to the `users` table. Rows are seeded out of band.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Corresponds to the `books` table. `tags` is filled from `book_tag_links`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub cover_image_url: Option<String>,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub rating: i32,
    #[sqlx(skip)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Corresponds to the `films` table. `tags` is filled from `film_tag_links`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Film {
    pub id: Uuid,
    pub poster_image_url: Option<String>,
    pub title: String,
    pub rating: i32,
    #[sqlx(skip)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Missing and `null` both decode to the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Writable book fields, used for both create and full update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: i32,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Writable film fields, used for both create and full update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: i32,
    #[serde(default)]
    pub poster_image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}
