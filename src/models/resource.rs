use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One path segment in a namespace's resource tree. A resource with
/// `parent_id = NULL` is the namespace root.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub namespace_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
