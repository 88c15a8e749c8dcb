pub mod handler;
pub mod proxy;
pub mod table;

pub use handler::RouteHandler;
pub use table::{DispatchTable, RouteEntry};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::state::SharedState;

use table::resolve;

/// Catch-all handler: everything the administrative API doesn't claim is
/// resolved against the live dispatch table.
pub async fn handle(State(state): State<SharedState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(|q| q.to_string());

    let routes = state.dispatch.load();
    let Some((entry, wildcards)) = resolve(&routes, &path, &parts.method) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "no route matched"})),
        )
            .into_response();
    };

    match &entry.handler {
        RouteHandler::Mock(mock) => {
            tracing::info!(
                namespace = %entry.namespace,
                url = %entry.url,
                method = %parts.method,
                auth_type = %entry.auth_type,
                status = %mock.status,
                "served mock response"
            );
            (
                mock.status,
                [("Content-Type", mock.content_type.clone())],
                mock.body.clone(),
            )
                .into_response()
        }
        RouteHandler::Proxy(route) => {
            let payload = if route.deny_upload {
                None
            } else {
                match axum::body::to_bytes(body, route.body_limit).await {
                    Ok(bytes) if bytes.is_empty() => None,
                    Ok(bytes) => Some(bytes),
                    Err(_) => {
                        return (
                            StatusCode::PAYLOAD_TOO_LARGE,
                            Json(json!({"error": "request body exceeds the configured limit"})),
                        )
                            .into_response();
                    }
                }
            };
            let content_type = parts
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());

            proxy::forward(
                &state.client,
                entry,
                route,
                &parts.method,
                &wildcards,
                query.as_deref(),
                content_type,
                payload,
            )
            .await
        }
    }
}
