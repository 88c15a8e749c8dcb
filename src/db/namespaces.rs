use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Namespace;

/// Namespaces in the store's registration order (newest first).
pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Namespace>, sqlx::Error> {
    if active_only {
        sqlx::query_as::<_, Namespace>(
            "SELECT * FROM namespaces WHERE active ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, Namespace>("SELECT * FROM namespaces ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Namespace>, sqlx::Error> {
    sqlx::query_as::<_, Namespace>("SELECT * FROM namespaces WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_by_route(pool: &PgPool, route: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM namespaces WHERE route = $1")
        .bind(route)
        .fetch_one(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    route: &str,
    description: &str,
) -> Result<Namespace, sqlx::Error> {
    sqlx::query_as::<_, Namespace>(
        "INSERT INTO namespaces (route, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(route)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    route: &str,
    description: &str,
    active: bool,
) -> Result<Namespace, sqlx::Error> {
    sqlx::query_as::<_, Namespace>(
        "UPDATE namespaces SET route = $2, description = $3, active = $4, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(route)
    .bind(description)
    .bind(active)
    .fetch_one(pool)
    .await
}

/// Recursive delete: resources and their methods go with the namespace via
/// cascading foreign keys.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM namespaces WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
