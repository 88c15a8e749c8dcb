use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::db::methods::MethodSpec;
use crate::error::AppError;
use crate::models::{EndpointProtocol, HttpMethod, IntegrationType, Method};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct MethodRequest {
    pub method: HttpMethod,
    pub integration_type: IntegrationType,
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub deny_upload: bool,
    #[serde(default = "default_body_limit")]
    pub body_limit: String,
    #[serde(default)]
    pub forwarded_method: String,
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "default_protocol")]
    pub endpoint_protocol: EndpointProtocol,
    #[serde(default)]
    pub content_handling: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: i64,
    #[serde(default)]
    pub mock_response_body: String,
    #[serde(default = "default_mock_code")]
    pub mock_response_code: i32,
    #[serde(default = "default_content_type")]
    pub mock_response_content: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_auth_type() -> String {
    "none".to_string()
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_body_limit() -> String {
    "1mb".to_string()
}

fn default_protocol() -> EndpointProtocol {
    EndpointProtocol::Http
}

fn default_timeout_ms() -> i64 {
    30_000
}

fn default_mock_code() -> i32 {
    200
}

fn default_active() -> bool {
    true
}

impl MethodRequest {
    fn into_spec(self) -> MethodSpec {
        MethodSpec {
            method: self.method,
            auth_type: self.auth_type,
            content_type: self.content_type,
            deny_upload: self.deny_upload,
            body_limit: self.body_limit,
            integration_type: self.integration_type,
            forwarded_method: self.forwarded_method,
            endpoint_url: self.endpoint_url,
            endpoint_protocol: self.endpoint_protocol,
            content_handling: self.content_handling,
            timeout_ms: self.timeout_ms,
            mock_response_body: self.mock_response_body,
            mock_response_code: self.mock_response_code,
            mock_response_content: self.mock_response_content,
            active: self.active,
        }
    }
}

pub async fn list_by_resource(
    State(state): State<SharedState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Vec<Method>>, AppError> {
    db::resources::find_by_id(&state.pool, resource_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    let methods = db::methods::list_by_resource(&state.pool, resource_id).await?;
    Ok(Json(methods))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(resource_id): Path<Uuid>,
    Json(req): Json<MethodRequest>,
) -> Result<Json<Method>, AppError> {
    db::resources::find_by_id(&state.pool, resource_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    if db::methods::count_for_resource(&state.pool, resource_id, req.method).await? > 0 {
        return Err(AppError::Conflict(
            "This resource already has a method for this verb".to_string(),
        ));
    }

    let spec = req.into_spec();
    validate_spec(&spec)?;

    let method = db::methods::create(&state.pool, resource_id, &spec)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(
                    "This resource already has a method for this verb".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?;

    Ok(Json(method))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Method>, AppError> {
    let method = db::methods::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Method not found".to_string()))?;
    Ok(Json(method))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MethodRequest>,
) -> Result<Json<Method>, AppError> {
    let existing = db::methods::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Method not found".to_string()))?;

    if existing.method != req.method
        && db::methods::count_for_resource(&state.pool, existing.resource_id, req.method).await?
            > 0
    {
        return Err(AppError::Conflict(
            "This resource already has a method for this verb".to_string(),
        ));
    }

    let spec = req.into_spec();
    validate_spec(&spec)?;

    let method = db::methods::update(&state.pool, id, &spec).await?;
    Ok(Json(method))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    db::methods::delete(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

/// HTTP integration needs a reachable upstream; the same rules the
/// flattener enforces are rejected here before anything is persisted.
fn validate_spec(spec: &MethodSpec) -> Result<(), AppError> {
    if spec.integration_type == IntegrationType::Http {
        if spec.endpoint_url.is_empty() {
            return Err(AppError::BadRequest(
                "Endpoint URL is mandatory for HTTP integration".to_string(),
            ));
        }
        if spec.auth_type.is_empty() {
            return Err(AppError::BadRequest("Auth type must be set".to_string()));
        }
        if spec.timeout_ms <= 0 {
            return Err(AppError::BadRequest(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        if spec.body_limit.is_empty() {
            return Err(AppError::BadRequest("Body limit must be set".to_string()));
        }
    }
    Ok(())
}
