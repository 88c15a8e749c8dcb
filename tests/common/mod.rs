use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Json;
use axum::Router;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use mockgate::config::Config;

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body, return (body, status).
    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// GET a path, return (body, status).
    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// PUT a JSON body, return (body, status).
    pub async fn put(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// DELETE a path, return (body, status).
    pub async fn delete(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Create a namespace, return its JSON.
    pub async fn create_namespace(&self, route: &str, description: &str) -> Value {
        let (body, status) = self
            .post(
                "/api/v1/namespaces",
                &json!({ "route": route, "description": description }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create namespace failed: {body}");
        body
    }

    /// Create a resource under a namespace, return its JSON.
    pub async fn create_resource(
        &self,
        namespace_id: &str,
        parent_id: Option<&str>,
        path: &str,
    ) -> Value {
        let (body, status) = self
            .post(
                &format!("/api/v1/namespaces/{namespace_id}/resources"),
                &json!({ "path": path, "parent_id": parent_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create resource failed: {body}");
        body
    }

    /// Create a method on a resource, return its JSON.
    pub async fn create_method(&self, resource_id: &str, method: &Value) -> Value {
        let (body, status) = self
            .post(&format!("/api/v1/resources/{resource_id}/methods"), method)
            .await;
        assert_eq!(status, StatusCode::OK, "create method failed: {body}");
        body
    }

    /// The root resource a namespace was provisioned with.
    pub async fn root_resource(&self, namespace_id: &str) -> Value {
        let (body, status) = self
            .get(&format!("/api/v1/namespaces/{namespace_id}/resources"))
            .await;
        assert_eq!(status, StatusCode::OK, "list resources failed: {body}");
        body.as_array()
            .and_then(|resources| {
                resources
                    .iter()
                    .find(|r| r["parent_id"].is_null())
                    .cloned()
            })
            .expect("namespace has no root resource")
    }

    /// Rebuild the dispatch table, return the summary JSON.
    pub async fn reload(&self) -> Value {
        let (body, status) = self.post("/api/v1/dispatch/reload", &json!({})).await;
        assert_eq!(status, StatusCode::OK, "reload failed: {body}");
        body
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("mockgate_test_{}", Uuid::new_v4().simple());

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 10 * 1024 * 1024,
        upstream_connect_timeout_secs: 5,
        log_level: "warn".to_string(),
    };

    let (app, _state) = mockgate::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Spawn a local upstream that echoes back what it received. `/slow`
/// stalls long enough to trip any sub-second proxy timeout.
pub async fn spawn_upstream() -> SocketAddr {
    async fn echo(req: Request<Body>) -> impl IntoResponse {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, 1024 * 1024).await.unwrap_or_default();
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "body": String::from_utf8_lossy(&bytes),
        }))
    }

    async fn slow() -> impl IntoResponse {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        "late"
    }

    let app = Router::new()
        .route("/slow", any(slow))
        .route("/", any(echo))
        .route("/{*path}", any(echo));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Upstream failed");
    });

    addr
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
