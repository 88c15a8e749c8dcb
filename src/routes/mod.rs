pub mod dispatch;
pub mod methods;
pub mod namespaces;
pub mod resources;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Namespaces
        .route(
            "/api/v1/namespaces",
            get(namespaces::list).post(namespaces::create),
        )
        .route(
            "/api/v1/namespaces/{id}",
            get(namespaces::get)
                .put(namespaces::update)
                .delete(namespaces::delete),
        )
        .route("/api/v1/namespaces/{id}/routes", get(namespaces::preview))
        // Resources
        .route(
            "/api/v1/namespaces/{id}/resources",
            get(resources::list_by_namespace).post(resources::create),
        )
        .route(
            "/api/v1/resources/{id}",
            get(resources::get)
                .put(resources::update)
                .delete(resources::delete),
        )
        // Methods
        .route(
            "/api/v1/resources/{id}/methods",
            get(methods::list_by_resource).post(methods::create),
        )
        .route(
            "/api/v1/methods/{id}",
            get(methods::get).put(methods::update).delete(methods::delete),
        )
        // Dispatch table
        .route("/api/v1/dispatch/reload", post(dispatch::reload))
}
