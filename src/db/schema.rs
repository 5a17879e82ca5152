use sqlx::PgPool;

/// Idempotent DDL for every table the catalog touches. Link rows reference
/// both sides; tag names are unique within their own kind only.
pub const CATALOG_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS books (
    id UUID PRIMARY KEY,
    cover_image_url TEXT,
    title TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT '',
    isbn TEXT,
    rating INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS book_tags (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS book_tag_links (
    book_id UUID NOT NULL REFERENCES books(id),
    tag_id UUID NOT NULL REFERENCES book_tags(id),
    PRIMARY KEY (book_id, tag_id)
);

CREATE TABLE IF NOT EXISTS films (
    id UUID PRIMARY KEY,
    poster_image_url TEXT,
    title TEXT NOT NULL,
    rating INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS film_tags (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS film_tag_links (
    film_id UUID NOT NULL REFERENCES films(id),
    tag_id UUID NOT NULL REFERENCES film_tags(id),
    PRIMARY KEY (film_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_books_created_at ON books (created_at DESC);
CREATE INDEX IF NOT EXISTS idx_films_created_at ON films (created_at DESC);
";

/// Creates any missing catalog tables. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> sqlx::Result<()> {
    sqlx::raw_sql(CATALOG_SCHEMA).execute(pool).await?;
    Ok(())
}
