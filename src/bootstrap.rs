use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::methods::MethodSpec;
use crate::dispatch::RouteEntry;
use crate::error::AppError;
use crate::models::{EndpointProtocol, HttpMethod, IntegrationType, Namespace};
use crate::routing::{build_tree, flatten, FlattenedRoute};
use crate::state::AppState;

/// Outcome of one dispatch-table build. Skipped namespaces failed
/// structural validation; the rest deployed.
#[derive(Debug, Serialize)]
pub struct DispatchSummary {
    pub namespaces: usize,
    pub routes: usize,
    pub skipped: Vec<SkippedNamespace>,
}

#[derive(Debug, Serialize)]
pub struct SkippedNamespace {
    pub id: Uuid,
    pub route: String,
    pub error: String,
}

/// Compile every active namespace into dispatch entries. A namespace whose
/// tree fails validation is logged and skipped; the others still deploy.
pub async fn build_entries(
    pool: &PgPool,
) -> Result<(Vec<RouteEntry>, DispatchSummary), sqlx::Error> {
    let namespaces = db::namespaces::list(pool, true).await?;

    let mut entries = Vec::new();
    let mut deployed = 0;
    let mut skipped = Vec::new();

    for namespace in &namespaces {
        let resources = db::resources::list_by_namespace(pool, namespace.id).await?;
        let methods = db::methods::list_active_by_namespace(pool, namespace.id).await?;

        let routes = build_tree(resources, methods).and_then(|tree| flatten(&tree, namespace));
        match routes {
            Ok(routes) => {
                deployed += 1;
                entries.extend(routes.iter().map(RouteEntry::compile));
            }
            Err(e) => {
                tracing::error!(
                    namespace = %namespace.route,
                    error = %e,
                    "skipping namespace, other namespaces still deploy"
                );
                skipped.push(SkippedNamespace {
                    id: namespace.id,
                    route: namespace.route.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let summary = DispatchSummary {
        namespaces: deployed,
        routes: entries.len(),
        skipped,
    };
    Ok((entries, summary))
}

/// Rebuild the dispatch table off to the side and swap it in. In-flight
/// requests keep the snapshot they loaded; new requests see the new table.
pub async fn reload(state: &AppState) -> Result<DispatchSummary, sqlx::Error> {
    let (entries, summary) = build_entries(&state.pool).await?;
    state.dispatch.replace(entries);
    tracing::info!(
        namespaces = summary.namespaces,
        routes = summary.routes,
        skipped = summary.skipped.len(),
        "dispatch table rebuilt"
    );
    Ok(summary)
}

/// Flatten one namespace without touching the live table. Backs the
/// administrative route-tree preview.
pub async fn flatten_namespace(
    pool: &PgPool,
    namespace_id: Uuid,
) -> Result<Vec<FlattenedRoute>, AppError> {
    let namespace = db::namespaces::find_by_id(pool, namespace_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Namespace not found".to_string()))?;

    let resources = db::resources::list_by_namespace(pool, namespace_id).await?;
    let methods = db::methods::list_active_by_namespace(pool, namespace_id).await?;

    let tree = build_tree(resources, methods)?;
    Ok(flatten(&tree, &namespace)?)
}

/// Auto-provision the root resource and its default mocked GET so a fresh
/// namespace is immediately routable.
pub async fn provision_defaults(pool: &PgPool, namespace: &Namespace) -> Result<(), sqlx::Error> {
    let root = db::resources::create(pool, namespace.id, None, "").await?;

    let spec = MethodSpec {
        method: HttpMethod::Get,
        auth_type: "none".to_string(),
        content_type: "application/json".to_string(),
        deny_upload: false,
        body_limit: "1mb".to_string(),
        integration_type: IntegrationType::Mock,
        forwarded_method: String::new(),
        endpoint_url: String::new(),
        endpoint_protocol: EndpointProtocol::Http,
        content_handling: String::new(),
        timeout_ms: 30_000,
        mock_response_body: serde_json::json!({"description": namespace.description})
            .to_string(),
        mock_response_code: 200,
        mock_response_content: "application/json".to_string(),
        active: true,
    };
    db::methods::create(pool, root.id, &spec).await?;
    Ok(())
}
