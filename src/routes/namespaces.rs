use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::bootstrap;
use crate::db;
use crate::error::AppError;
use crate::models::Namespace;
use crate::routing::FlattenedRoute;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateNamespace {
    pub route: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateNamespace {
    pub route: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Namespace>>, AppError> {
    let namespaces = db::namespaces::list(&state.pool, false).await?;
    Ok(Json(namespaces))
}

/// Create a namespace and auto-provision its root resource plus a default
/// mocked GET, so the namespace is routable right after the next reload.
pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateNamespace>,
) -> Result<Json<Namespace>, AppError> {
    validate_route(&req.route)?;

    if db::namespaces::count_by_route(&state.pool, &req.route).await? > 0 {
        return Err(AppError::Conflict(
            "A namespace with this route already exists".to_string(),
        ));
    }

    let namespace = db::namespaces::create(&state.pool, &req.route, &req.description)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A namespace with this route already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

    bootstrap::provision_defaults(&state.pool, &namespace).await?;

    Ok(Json(namespace))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Namespace>, AppError> {
    let namespace = db::namespaces::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Namespace not found".to_string()))?;
    Ok(Json(namespace))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNamespace>,
) -> Result<Json<Namespace>, AppError> {
    validate_route(&req.route)?;

    let existing = db::namespaces::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Namespace not found".to_string()))?;

    if existing.route != req.route
        && db::namespaces::count_by_route(&state.pool, &req.route).await? > 0
    {
        return Err(AppError::Conflict(
            "A namespace with this route already exists".to_string(),
        ));
    }

    let namespace =
        db::namespaces::update(&state.pool, id, &req.route, &req.description, req.active)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => AppError::NotFound("Namespace not found".to_string()),
                _ => AppError::Database(e),
            })?;

    Ok(Json(namespace))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    db::namespaces::delete(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

/// Preview the flattened route list without touching the live dispatch
/// table. Structural violations come back as 400 with the offending detail.
pub async fn preview(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FlattenedRoute>>, AppError> {
    let routes = bootstrap::flatten_namespace(&state.pool, id).await?;
    Ok(Json(routes))
}

fn validate_route(route: &str) -> Result<(), AppError> {
    if route.is_empty() || route.len() > 100 {
        return Err(AppError::BadRequest(
            "Route must be between 1 and 100 characters".to_string(),
        ));
    }
    if !route
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(AppError::BadRequest(
            "Route must be a URL-safe segment without '/'".to_string(),
        ));
    }
    Ok(())
}
