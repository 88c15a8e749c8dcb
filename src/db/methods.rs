use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EndpointProtocol, HttpMethod, IntegrationType, Method};

/// Field set shared by create and update.
pub struct MethodSpec {
    pub method: HttpMethod,
    pub auth_type: String,
    pub content_type: String,
    pub deny_upload: bool,
    pub body_limit: String,
    pub integration_type: IntegrationType,
    pub forwarded_method: String,
    pub endpoint_url: String,
    pub endpoint_protocol: EndpointProtocol,
    pub content_handling: String,
    pub timeout_ms: i64,
    pub mock_response_body: String,
    pub mock_response_code: i32,
    pub mock_response_content: String,
    pub active: bool,
}

pub async fn list_by_resource(
    pool: &PgPool,
    resource_id: Uuid,
) -> Result<Vec<Method>, sqlx::Error> {
    sqlx::query_as::<_, Method>(
        "SELECT * FROM methods WHERE resource_id = $1 ORDER BY created_at",
    )
    .bind(resource_id)
    .fetch_all(pool)
    .await
}

/// Active methods across all of a namespace's resources, the flattener's
/// working set.
pub async fn list_active_by_namespace(
    pool: &PgPool,
    namespace_id: Uuid,
) -> Result<Vec<Method>, sqlx::Error> {
    sqlx::query_as::<_, Method>(
        "SELECT m.* FROM methods m
         JOIN resources r ON m.resource_id = r.id
         WHERE r.namespace_id = $1 AND m.active
         ORDER BY m.created_at",
    )
    .bind(namespace_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Method>, sqlx::Error> {
    sqlx::query_as::<_, Method>("SELECT * FROM methods WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Methods sharing (resource, verb). Backs the per-resource uniqueness check.
pub async fn count_for_resource(
    pool: &PgPool,
    resource_id: Uuid,
    method: HttpMethod,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM methods WHERE resource_id = $1 AND method = $2",
    )
    .bind(resource_id)
    .bind(method)
    .fetch_one(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    resource_id: Uuid,
    spec: &MethodSpec,
) -> Result<Method, sqlx::Error> {
    sqlx::query_as::<_, Method>(
        "INSERT INTO methods (resource_id, method, auth_type, content_type, deny_upload,
             body_limit, integration_type, forwarded_method, endpoint_url,
             endpoint_protocol, content_handling, timeout_ms, mock_response_body,
             mock_response_code, mock_response_content, active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
         RETURNING *",
    )
    .bind(resource_id)
    .bind(spec.method)
    .bind(&spec.auth_type)
    .bind(&spec.content_type)
    .bind(spec.deny_upload)
    .bind(&spec.body_limit)
    .bind(spec.integration_type)
    .bind(&spec.forwarded_method)
    .bind(&spec.endpoint_url)
    .bind(spec.endpoint_protocol)
    .bind(&spec.content_handling)
    .bind(spec.timeout_ms)
    .bind(&spec.mock_response_body)
    .bind(spec.mock_response_code)
    .bind(&spec.mock_response_content)
    .bind(spec.active)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, id: Uuid, spec: &MethodSpec) -> Result<Method, sqlx::Error> {
    sqlx::query_as::<_, Method>(
        "UPDATE methods SET method = $2, auth_type = $3, content_type = $4, deny_upload = $5,
             body_limit = $6, integration_type = $7, forwarded_method = $8, endpoint_url = $9,
             endpoint_protocol = $10, content_handling = $11, timeout_ms = $12,
             mock_response_body = $13, mock_response_code = $14, mock_response_content = $15,
             active = $16, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(spec.method)
    .bind(&spec.auth_type)
    .bind(&spec.content_type)
    .bind(spec.deny_upload)
    .bind(&spec.body_limit)
    .bind(spec.integration_type)
    .bind(&spec.forwarded_method)
    .bind(&spec.endpoint_url)
    .bind(spec.endpoint_protocol)
    .bind(&spec.content_handling)
    .bind(spec.timeout_ms)
    .bind(&spec.mock_response_body)
    .bind(spec.mock_response_code)
    .bind(&spec.mock_response_content)
    .bind(spec.active)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM methods WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
