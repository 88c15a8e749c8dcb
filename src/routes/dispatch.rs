use axum::extract::State;
use axum::Json;

use crate::bootstrap::{self, DispatchSummary};
use crate::error::AppError;
use crate::state::SharedState;

/// Rebuild the dispatch table from the current configuration and swap it
/// in. Namespaces that fail validation are reported back, not deployed.
pub async fn reload(State(state): State<SharedState>) -> Result<Json<DispatchSummary>, AppError> {
    let summary = bootstrap::reload(&state).await?;
    Ok(Json(summary))
}
