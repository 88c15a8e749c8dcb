use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "http_method", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Any,
    Options,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Any => "ANY",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "integration_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrationType {
    Http,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "endpoint_protocol", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EndpointProtocol {
    Http,
    Https,
}

/// One HTTP verb bound to a resource, serving either a canned mock response
/// or a forwarded upstream call.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Method {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub method: HttpMethod,
    pub auth_type: String,
    pub content_type: String,
    pub deny_upload: bool,
    pub body_limit: String,
    pub integration_type: IntegrationType,
    pub forwarded_method: String,
    pub endpoint_url: String,
    pub endpoint_protocol: EndpointProtocol,
    pub content_handling: String,
    pub timeout_ms: i64,
    pub mock_response_body: String,
    pub mock_response_code: i32,
    pub mock_response_content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
