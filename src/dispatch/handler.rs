use std::time::Duration;

use axum::http::StatusCode;

use crate::models::IntegrationType;
use crate::routing::FlattenedRoute;

const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Request-time behavior of a route, selected once when the dispatch table
/// is compiled. Adding a new integration type means adding a variant here.
#[derive(Debug, Clone)]
pub enum RouteHandler {
    Mock(MockRoute),
    Proxy(ProxyRoute),
}

/// Canned response served without touching any upstream.
#[derive(Debug, Clone)]
pub struct MockRoute {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

/// Forwarded upstream call with path-parameter substitution.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pub endpoint_url: String,
    pub https: bool,
    pub deny_upload: bool,
    pub body_limit: usize,
    pub timeout: Duration,
}

impl RouteHandler {
    pub fn compile(route: &FlattenedRoute) -> Self {
        match route.integration_type {
            IntegrationType::Mock => RouteHandler::Mock(MockRoute {
                status: StatusCode::from_u16(route.mock_response_code.try_into().unwrap_or(200))
                    .unwrap_or(StatusCode::OK),
                content_type: route.mock_response_content.clone(),
                body: route.mock_response_body.clone(),
            }),
            IntegrationType::Http => RouteHandler::Proxy(ProxyRoute {
                endpoint_url: route.endpoint_url.clone(),
                https: route.https,
                deny_upload: route.deny_upload,
                body_limit: parse_body_limit(&route.body_limit).unwrap_or_else(|| {
                    tracing::warn!(
                        url = %route.url,
                        body_limit = %route.body_limit,
                        "unparseable body limit, falling back to 1mb"
                    );
                    DEFAULT_BODY_LIMIT
                }),
                timeout: Duration::from_millis(route.timeout_ms.try_into().unwrap_or(30_000)),
            }),
        }
    }
}

/// Parse a "1mb"-style size string. Bare digits are bytes.
pub fn parse_body_limit(value: &str) -> Option<usize> {
    let value = value.trim().to_ascii_lowercase();
    let (number, multiplier) = if let Some(n) = value.strip_suffix("gb") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = value.strip_suffix("mb") {
        (n, 1024 * 1024)
    } else if let Some(n) = value.strip_suffix("kb") {
        (n, 1024)
    } else if let Some(n) = value.strip_suffix('b') {
        (n, 1)
    } else {
        (value.as_str(), 1)
    };
    let number: usize = number.trim().parse().ok()?;
    Some(number * multiplier)
}
