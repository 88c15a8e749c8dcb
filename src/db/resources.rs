use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Resource;

/// All resources of a namespace in creation order. Sibling order in the
/// flattened route list follows this ordering.
pub async fn list_by_namespace(
    pool: &PgPool,
    namespace_id: Uuid,
) -> Result<Vec<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>(
        "SELECT * FROM resources WHERE namespace_id = $1 ORDER BY created_at",
    )
    .bind(namespace_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Resource>, sqlx::Error> {
    sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Resources sharing (namespace, parent, path). Backs the sibling
/// uniqueness check. `parent_id = NULL` compares as the root level.
pub async fn count_siblings(
    pool: &PgPool,
    namespace_id: Uuid,
    parent_id: Option<Uuid>,
    path: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM resources
         WHERE namespace_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND path = $3",
    )
    .bind(namespace_id)
    .bind(parent_id)
    .bind(path)
    .fetch_one(pool)
    .await
}

pub async fn count_roots(pool: &PgPool, namespace_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM resources WHERE namespace_id = $1 AND parent_id IS NULL",
    )
    .bind(namespace_id)
    .fetch_one(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    namespace_id: Uuid,
    parent_id: Option<Uuid>,
    path: &str,
) -> Result<Resource, sqlx::Error> {
    sqlx::query_as::<_, Resource>(
        "INSERT INTO resources (namespace_id, parent_id, path)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(namespace_id)
    .bind(parent_id)
    .bind(path)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, path: &str) -> Result<Resource, sqlx::Error> {
    sqlx::query_as::<_, Resource>(
        "UPDATE resources SET path = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(path)
    .fetch_one(pool)
    .await
}

/// Recursive delete: child resources and methods follow via cascading
/// foreign keys.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
