use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::Resource;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateResource {
    pub path: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateResource {
    pub path: String,
}

pub async fn list_by_namespace(
    State(state): State<SharedState>,
    Path(namespace_id): Path<Uuid>,
) -> Result<Json<Vec<Resource>>, AppError> {
    db::namespaces::find_by_id(&state.pool, namespace_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Namespace not found".to_string()))?;

    let resources = db::resources::list_by_namespace(&state.pool, namespace_id).await?;
    Ok(Json(resources))
}

pub async fn create(
    State(state): State<SharedState>,
    Path(namespace_id): Path<Uuid>,
    Json(req): Json<CreateResource>,
) -> Result<Json<Resource>, AppError> {
    db::namespaces::find_by_id(&state.pool, namespace_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Namespace not found".to_string()))?;

    match req.parent_id {
        Some(parent_id) => {
            validate_path(&req.path)?;
            let parent = db::resources::find_by_id(&state.pool, parent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent resource not found".to_string()))?;
            if parent.namespace_id != namespace_id {
                return Err(AppError::BadRequest(
                    "Parent resource belongs to a different namespace".to_string(),
                ));
            }
        }
        None => {
            // One root per namespace; the flattener relies on it.
            if db::resources::count_roots(&state.pool, namespace_id).await? > 0 {
                return Err(AppError::Conflict(
                    "Namespace already has a root resource".to_string(),
                ));
            }
        }
    }

    if db::resources::count_siblings(&state.pool, namespace_id, req.parent_id, &req.path).await? > 0
    {
        return Err(AppError::Conflict(
            "A resource with this path already exists under this parent".to_string(),
        ));
    }

    let resource = db::resources::create(&state.pool, namespace_id, req.parent_id, &req.path)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(
                    "A resource with this path already exists under this parent".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?;

    Ok(Json(resource))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Resource>, AppError> {
    let resource = db::resources::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;
    Ok(Json(resource))
}

pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResource>,
) -> Result<Json<Resource>, AppError> {
    let existing = db::resources::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    if existing.parent_id.is_some() {
        validate_path(&req.path)?;
    }

    if existing.path != req.path
        && db::resources::count_siblings(
            &state.pool,
            existing.namespace_id,
            existing.parent_id,
            &req.path,
        )
        .await?
            > 0
    {
        return Err(AppError::Conflict(
            "A resource with this path already exists under this parent".to_string(),
        ));
    }

    let resource = db::resources::update(&state.pool, id, &req.path).await?;
    Ok(Json(resource))
}

pub async fn delete(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    db::resources::delete(&state.pool, id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

fn validate_path(path: &str) -> Result<(), AppError> {
    if path.is_empty() || path.len() > 100 {
        return Err(AppError::BadRequest(
            "Path must be between 1 and 100 characters".to_string(),
        ));
    }
    if !path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ':')
    {
        return Err(AppError::BadRequest(
            "Path must be a URL-safe segment without '/'".to_string(),
        ));
    }
    Ok(())
}
