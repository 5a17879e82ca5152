use sqlx::{Connection, PgConnection, Result};
use tracing::warn;
use uuid::Uuid;

use crate::db::enums::TagKind;

// --- Tag Service Functions ---

/// Returns the id of the tag named `name`, creating the row if it does not exist.
/// A name conflict turns the insert into a no-op update so the existing id is
/// returned in the same round trip, even when two writers race on one name.
pub async fn resolve_tag(conn: &mut PgConnection, kind: TagKind, name: &str) -> Result<Uuid> {
    let sql = format!(
        r#"
        INSERT INTO {} (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
        kind.tag_table()
    );
    sqlx::query_scalar::<_, Uuid>(&sql)
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(conn)
        .await
}

/// Associates a tag with an entity. Ignores conflicts if the association already exists.
pub async fn link_tag(
    conn: &mut PgConnection,
    kind: TagKind,
    entity_id: Uuid,
    tag_id: Uuid,
) -> Result<u64> {
    let sql = format!(
        "INSERT INTO {} ({}, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.link_table(),
        kind.entity_column()
    );
    let rows_affected = sqlx::query(&sql)
        .bind(entity_id)
        .bind(tag_id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows_affected)
}

/// Removes every tag association of an entity. Tag rows themselves are kept.
pub async fn unlink_all_tags(conn: &mut PgConnection, kind: TagKind, entity_id: Uuid) -> Result<u64> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1",
        kind.link_table(),
        kind.entity_column()
    );
    let rows_affected = sqlx::query(&sql)
        .bind(entity_id)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows_affected)
}

/// Retrieves the names of all tags linked to an entity.
pub async fn tag_names_for(conn: &mut PgConnection, kind: TagKind, entity_id: Uuid) -> Result<Vec<String>> {
    let sql = format!(
        r#"
        SELECT t.name
        FROM {} t
        INNER JOIN {} l ON t.id = l.tag_id
        WHERE l.{} = $1
        ORDER BY t.name
        "#,
        kind.tag_table(),
        kind.link_table(),
        kind.entity_column()
    );
    sqlx::query_scalar::<_, String>(&sql)
        .bind(entity_id)
        .fetch_all(conn)
        .await
}

/// Resolves and links each name to the entity. Must be called inside an open
/// transaction; every tag gets its own savepoint, and a tag that fails is
/// rolled back to that savepoint and left out while the rest are still linked.
pub async fn attach_tags(
    conn: &mut PgConnection,
    kind: TagKind,
    entity_id: Uuid,
    names: &[String],
) -> Result<()> {
    for name in names {
        let mut savepoint = conn.begin().await?;
        let outcome = match resolve_tag(&mut savepoint, kind, name).await {
            Ok(tag_id) => link_tag(&mut savepoint, kind, entity_id, tag_id).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(_) => savepoint.commit().await?,
            Err(e) => {
                warn!(%kind, %entity_id, tag = %name, error = %e, "Skipping tag that could not be attached.");
                savepoint.rollback().await?;
            }
        }
    }
    Ok(())
}
