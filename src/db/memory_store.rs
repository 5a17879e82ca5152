//! In-process `CatalogStore` used by the test suite. It keeps the same rules as
//! the Postgres schema: tag names are unique per kind, link rows are a set,
//! and every call runs under one lock so writes are all-or-nothing.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::enums::TagKind;
use crate::db::models::{Book, BookInput, Film, FilmInput, User};
use crate::db::store::CatalogStore;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    books: HashMap<Uuid, Book>,
    films: HashMap<Uuid, Film>,
    tags: HashMap<TagKind, HashMap<String, Uuid>>,
    links: HashMap<TagKind, HashSet<(Uuid, Uuid)>>,
}

impl Inner {
    fn resolve_tag(&mut self, kind: TagKind, name: &str) -> Result<Uuid> {
        // Postgres TEXT cannot hold NUL, so the real store fails these too.
        if name.contains('\0') {
            return Err(sqlx::Error::Protocol(
                "invalid byte sequence for encoding \"UTF8\": 0x00".to_string(),
            ));
        }
        let namespace = self.tags.entry(kind).or_default();
        Ok(*namespace.entry(name.to_string()).or_insert_with(Uuid::new_v4))
    }

    fn attach_tags(&mut self, kind: TagKind, entity_id: Uuid, names: &[String]) {
        for name in names {
            if let Ok(tag_id) = self.resolve_tag(kind, name) {
                self.links.entry(kind).or_default().insert((entity_id, tag_id));
            }
        }
    }

    fn unlink_all_tags(&mut self, kind: TagKind, entity_id: Uuid) {
        if let Some(links) = self.links.get_mut(&kind) {
            links.retain(|(owner, _)| *owner != entity_id);
        }
    }

    fn tag_names_for(&self, kind: TagKind, entity_id: Uuid) -> Vec<String> {
        let Some(links) = self.links.get(&kind) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .tags
            .get(&kind)
            .into_iter()
            .flatten()
            .filter(|(_, tag_id)| links.contains(&(entity_id, **tag_id)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn book_with_tags(&self, book: &Book) -> Book {
        let mut book = book.clone();
        book.tags = self.tag_names_for(TagKind::Book, book.id);
        book
    }

    fn film_with_tags(&self, film: &Film) -> Film {
        let mut film = film.clone();
        film.tags = self.tag_names_for(TagKind::Film, film.id);
        film
    }
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<Inner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.inner.lock().unwrap().users.push(user);
    }

    pub fn resolve_tag(&self, kind: TagKind, name: &str) -> Result<Uuid> {
        self.inner.lock().unwrap().resolve_tag(kind, name)
    }

    /// All tag names that exist for `kind`, linked or not.
    pub fn tag_names(&self, kind: TagKind) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner
            .tags
            .get(&kind)
            .map(|namespace| namespace.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn link_count(&self, kind: TagKind) -> usize {
        self.inner
            .lock()
            .unwrap()
            .links
            .get(&kind)
            .map_or(0, HashSet::len)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        let inner = self.inner.lock().unwrap();
        let mut books: Vec<Book> = inner.books.values().map(|b| inner.book_with_tags(b)).collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(books)
    }

    async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.books.get(&id).map(|b| inner.book_with_tags(b)))
    }

    async fn create_book(&self, input: &BookInput) -> Result<Book> {
        let mut inner = self.inner.lock().unwrap();
        let book = Book {
            id: Uuid::new_v4(),
            cover_image_url: input.cover_image_url.clone(),
            title: input.title.clone(),
            author: input.author.clone(),
            isbn: input.isbn.clone(),
            rating: input.rating,
            tags: Vec::new(),
            created_at: Utc::now(),
        };
        inner.books.insert(book.id, book.clone());
        inner.attach_tags(TagKind::Book, book.id, &input.tags);
        Ok(inner.book_with_tags(&book))
    }

    async fn update_book(&self, id: Uuid, input: &BookInput) -> Result<Option<Book>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(book) = inner.books.get_mut(&id) else {
            return Ok(None);
        };
        book.cover_image_url = input.cover_image_url.clone();
        book.title = input.title.clone();
        book.author = input.author.clone();
        book.isbn = input.isbn.clone();
        book.rating = input.rating;
        let book = book.clone();

        inner.unlink_all_tags(TagKind::Book, id);
        inner.attach_tags(TagKind::Book, id, &input.tags);
        Ok(Some(inner.book_with_tags(&book)))
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.books.contains_key(&id) {
            return Ok(false);
        }
        inner.unlink_all_tags(TagKind::Book, id);
        inner.books.remove(&id);
        Ok(true)
    }

    async fn list_films(&self) -> Result<Vec<Film>> {
        let inner = self.inner.lock().unwrap();
        let mut films: Vec<Film> = inner.films.values().map(|f| inner.film_with_tags(f)).collect();
        films.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(films)
    }

    async fn get_film(&self, id: Uuid) -> Result<Option<Film>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.films.get(&id).map(|f| inner.film_with_tags(f)))
    }

    async fn create_film(&self, input: &FilmInput) -> Result<Film> {
        let mut inner = self.inner.lock().unwrap();
        let film = Film {
            id: Uuid::new_v4(),
            poster_image_url: input.poster_image_url.clone(),
            title: input.title.clone(),
            rating: input.rating,
            tags: Vec::new(),
            created_at: Utc::now(),
        };
        inner.films.insert(film.id, film.clone());
        inner.attach_tags(TagKind::Film, film.id, &input.tags);
        Ok(inner.film_with_tags(&film))
    }

    async fn update_film(&self, id: Uuid, input: &FilmInput) -> Result<Option<Film>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(film) = inner.films.get_mut(&id) else {
            return Ok(None);
        };
        film.poster_image_url = input.poster_image_url.clone();
        film.title = input.title.clone();
        film.rating = input.rating;
        let film = film.clone();

        inner.unlink_all_tags(TagKind::Film, id);
        inner.attach_tags(TagKind::Film, id, &input.tags);
        Ok(Some(inner.film_with_tags(&film)))
    }

    async fn delete_film(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.films.contains_key(&id) {
            return Ok(false);
        }
        inner.unlink_all_tags(TagKind::Film, id);
        inner.films.remove(&id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn book(title: &str, tags: &[&str]) -> BookInput {
        BookInput {
            title: title.to_string(),
            author: "Don Norman".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolution_yields_one_tag() {
        let store = Arc::new(MemoryCatalogStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.resolve_tag(TagKind::Book, "fiction").unwrap() })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 1);
        assert_eq!(store.tag_names(TagKind::Book), vec!["fiction".to_string()]);
    }

    #[tokio::test]
    async fn test_book_and_film_tags_are_separate_namespaces() {
        let store = MemoryCatalogStore::new();

        let book_tag = store.resolve_tag(TagKind::Book, "drama").unwrap();
        let film_tag = store.resolve_tag(TagKind::Film, "drama").unwrap();

        assert_ne!(book_tag, film_tag);
        assert_eq!(store.tag_names(TagKind::Film), vec!["drama".to_string()]);
    }

    #[tokio::test]
    async fn test_update_replaces_tags_and_keeps_orphan_rows() {
        let store = MemoryCatalogStore::new();
        let created = store.create_book(&book("The Design of Everyday Things", &["a", "b"])).await.unwrap();
        assert_eq!(created.tags, vec!["a", "b"]);

        let updated = store
            .update_book(created.id, &book("The Design of Everyday Things", &["b", "c"]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.tags, vec!["b", "c"]);
        assert_eq!(store.tag_names(TagKind::Book), vec!["a", "b", "c"]);
        assert_eq!(store.link_count(TagKind::Book), 2);
    }

    #[tokio::test]
    async fn test_duplicate_tag_names_link_once() {
        let store = MemoryCatalogStore::new();
        let created = store.create_book(&book("Refactoring", &["programming", "programming"])).await.unwrap();

        assert_eq!(created.tags, vec!["programming"]);
        assert_eq!(store.link_count(TagKind::Book), 1);
    }

    #[tokio::test]
    async fn test_failed_tag_is_dropped_and_create_succeeds() {
        let store = MemoryCatalogStore::new();
        let created = store.create_book(&book("Refactoring", &["ok", "bad\0tag"])).await.unwrap();

        assert_eq!(created.tags, vec!["ok"]);
        assert_eq!(store.tag_names(TagKind::Book), vec!["ok"]);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_links() {
        let store = MemoryCatalogStore::new();
        let created = store.create_book(&book("Refactoring", &["programming"])).await.unwrap();

        assert!(store.delete_book(created.id).await.unwrap());
        assert!(store.get_book(created.id).await.unwrap().is_none());
        assert!(store.list_books().await.unwrap().is_empty());
        assert_eq!(store.link_count(TagKind::Book), 0);
        assert_eq!(store.tag_names(TagKind::Book), vec!["programming"]);

        assert!(!store.delete_book(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_film_reports_none() {
        let store = MemoryCatalogStore::new();
        let input = FilmInput {
            title: "Stalker".to_string(),
            ..Default::default()
        };

        assert!(store.update_film(Uuid::new_v4(), &input).await.unwrap().is_none());
        assert!(store.tag_names(TagKind::Film).is_empty());
    }
}
