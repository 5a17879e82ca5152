use async_trait::async_trait;
use sqlx::{PgPool, Result};
use uuid::Uuid;

use crate::db::models::{Book, BookInput, Film, FilmInput, User};
use crate::db::services;

/// Everything the HTTP layer needs from storage. Each mutating call is atomic:
/// the entity row and all of its tag links commit together or not at all.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn list_books(&self) -> Result<Vec<Book>>;
    async fn get_book(&self, id: Uuid) -> Result<Option<Book>>;
    async fn create_book(&self, input: &BookInput) -> Result<Book>;
    /// `None` means no book with that id exists.
    async fn update_book(&self, id: Uuid, input: &BookInput) -> Result<Option<Book>>;
    /// `false` means no book with that id exists.
    async fn delete_book(&self, id: Uuid) -> Result<bool>;

    async fn list_films(&self) -> Result<Vec<Film>>;
    async fn get_film(&self, id: Uuid) -> Result<Option<Film>>;
    async fn create_film(&self, input: &FilmInput) -> Result<Film>;
    async fn update_film(&self, id: Uuid, input: &FilmInput) -> Result<Option<Film>>;
    async fn delete_film(&self, id: Uuid) -> Result<bool>;
}

/// `CatalogStore` backed by the Postgres services.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        services::get_user_by_username(&self.pool, username).await
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        services::list_books(&self.pool).await
    }

    async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
        services::get_book(&self.pool, id).await
    }

    async fn create_book(&self, input: &BookInput) -> Result<Book> {
        services::create_book(&self.pool, input).await
    }

    async fn update_book(&self, id: Uuid, input: &BookInput) -> Result<Option<Book>> {
        services::update_book(&self.pool, id, input).await
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool> {
        services::delete_book(&self.pool, id).await
    }

    async fn list_films(&self) -> Result<Vec<Film>> {
        services::list_films(&self.pool).await
    }

    async fn get_film(&self, id: Uuid) -> Result<Option<Film>> {
        services::get_film(&self.pool, id).await
    }

    async fn create_film(&self, input: &FilmInput) -> Result<Film> {
        services::create_film(&self.pool, input).await
    }

    async fn update_film(&self, id: Uuid, input: &FilmInput) -> Result<Option<Film>> {
        services::update_film(&self.pool, id, input).await
    }

    async fn delete_film(&self, id: Uuid) -> Result<bool> {
        services::delete_film(&self.pool, id).await
    }
}
