use axum::http::{Method as Verb, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::json;

use super::handler::ProxyRoute;
use super::table::RouteEntry;

/// Build the upstream URL: substitute `:placeholder` segments left-to-right
/// from the captured wildcard segments, prefix the scheme when the
/// configured URL carries none, and reattach the original query string.
///
/// Extra captures beyond the placeholders are dropped. Fewer captures than
/// placeholders is an error; the request is rejected instead of forwarding
/// a URL with unresolved placeholders.
pub fn build_target_url(
    route: &ProxyRoute,
    wildcards: &[&str],
    query: Option<&str>,
) -> Result<String, usize> {
    let mut captures = wildcards.iter();
    let mut unresolved = 0;
    let mut segments = Vec::new();
    for segment in route.endpoint_url.split('/') {
        if segment.starts_with(':') {
            match captures.next() {
                Some(value) => segments.push(*value),
                None => unresolved += 1,
            }
        } else {
            segments.push(segment);
        }
    }
    if unresolved > 0 {
        return Err(unresolved);
    }

    let joined = segments.join("/");
    let scheme = if route.https { "https" } else { "http" };
    let mut url = if joined.contains("://") {
        joined
    } else {
        format!("{scheme}://{joined}")
    };
    if let Some(query) = query {
        url = format!("{url}?{query}");
    }
    Ok(url)
}

/// Forward the request upstream and pass the response through unmodified.
/// Timeouts become 504, transport errors 502; neither escapes the handler.
pub async fn forward(
    client: &reqwest::Client,
    entry: &RouteEntry,
    route: &ProxyRoute,
    verb: &Verb,
    wildcards: &[&str],
    query: Option<&str>,
    content_type: Option<String>,
    body: Option<Bytes>,
) -> Response {
    let target = match build_target_url(route, wildcards, query) {
        Ok(target) => target,
        Err(unresolved) => {
            tracing::warn!(
                url = %entry.url,
                endpoint_url = %route.endpoint_url,
                unresolved,
                "request supplies fewer path segments than the endpoint expects"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("missing {unresolved} path segment(s) required by this route")
                })),
            )
                .into_response();
        }
    };

    let method = reqwest::Method::from_bytes(verb.as_str().as_bytes())
        .unwrap_or(reqwest::Method::GET);

    let mut request = client.request(method, &target).timeout(route.timeout);
    if let Some(content_type) = content_type {
        request = request.header("Content-Type", content_type);
    }
    if let Some(body) = body {
        request = request.body(body);
    }

    match request.send().await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status().as_u16())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = upstream
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string());
            let body = upstream.bytes().await.unwrap_or_default();

            let echo: String = String::from_utf8_lossy(&body).chars().take(1024).collect();
            tracing::info!(
                namespace = %entry.namespace,
                url = %entry.url,
                target = %target,
                method = %verb,
                auth_type = %entry.auth_type,
                status = %status,
                response = %echo,
                "forwarded request"
            );

            match content_type {
                Some(content_type) => {
                    (status, [("Content-Type", content_type)], body).into_response()
                }
                None => (status, body).into_response(),
            }
        }
        Err(e) if e.is_timeout() => {
            tracing::error!(url = %entry.url, target = %target, "upstream timed out");
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({"error": "upstream request timed out"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(url = %entry.url, target = %target, error = %e, "upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": "upstream request failed"})),
            )
                .into_response()
        }
    }
}
