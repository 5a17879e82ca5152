//! Shared Postgres setup for the service tests. They run against the database
//! named by `DATABASE_URL` and are skipped when it is not set. Tests share that
//! database, so every tag name they create carries a random suffix.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::db::schema::CATALOG_SCHEMA;

// Serializes schema bootstrap across concurrently running tests.
const SCHEMA_LOCK_KEY: i64 = 0x6d65_6469_6173;

pub async fn connect() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping Postgres test.");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .unwrap();
    sqlx::raw_sql(CATALOG_SCHEMA).execute(&mut *conn).await.unwrap();
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    Some(pool)
}

pub fn unique(name: &str) -> String {
    format!("{name}-{}", Uuid::new_v4().simple())
}

pub async fn tag_row_count(pool: &PgPool, table: &str, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table} WHERE name = $1"))
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}
