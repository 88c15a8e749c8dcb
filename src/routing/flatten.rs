use serde::Serialize;
use uuid::Uuid;

use crate::models::{EndpointProtocol, HttpMethod, IntegrationType, Namespace};

use super::tree::ResourceNode;
use super::RoutingError;

/// One concrete routable endpoint, derived from a (resource, method) pair.
/// `order` is the depth-first emission index and determines registration
/// order in the dispatch table.
#[derive(Debug, Clone, Serialize)]
pub struct FlattenedRoute {
    pub id: Uuid,
    pub namespace_id: Uuid,
    pub namespace: String,
    pub url: String,
    pub endpoint_url: String,
    pub https: bool,
    pub method: HttpMethod,
    pub deny_upload: bool,
    pub body_limit: String,
    pub auth_type: String,
    pub timeout_ms: i64,
    pub integration_type: IntegrationType,
    pub mock_response_body: String,
    pub mock_response_code: i32,
    pub mock_response_content: String,
    pub order: i32,
}

/// Flatten a namespace's resource tree into its ordered route list.
///
/// Depth-first pre-order over an explicit worklist. Any structural violation
/// aborts the whole namespace; no partial route list is ever returned.
pub fn flatten(root: &ResourceNode, namespace: &Namespace) -> Result<Vec<FlattenedRoute>, RoutingError> {
    let mut routes = Vec::new();
    let mut order = 0;
    let mut stack: Vec<(&ResourceNode, String)> = vec![(root, String::new())];

    while let Some((node, parent_url)) = stack.pop() {
        let url = if node.resource.parent_id.is_none() {
            format!("/{}", namespace.route)
        } else {
            if node.resource.path.is_empty() {
                return Err(RoutingError::InvalidStructure(format!(
                    "resource under '{parent_url}' has an empty path"
                )));
            }
            format!("{}/{}", parent_url, node.resource.path)
        };

        if node.methods.is_empty() {
            return Err(RoutingError::InvalidStructure(if node.resource.parent_id.is_none() {
                "all resources should have at least one method".to_string()
            } else {
                format!("resource '{url}' has no methods")
            }));
        }

        for method in &node.methods {
            let verb = method.method.as_str();
            if method.integration_type == IntegrationType::Http && method.endpoint_url.is_empty() {
                return Err(RoutingError::InvalidStructure(format!(
                    "method {verb} on '{url}' has HTTP integration but no endpoint url"
                )));
            }
            if method.auth_type.is_empty() {
                return Err(RoutingError::InvalidStructure(format!(
                    "method {verb} on '{url}' is missing an auth type"
                )));
            }
            if method.timeout_ms <= 0 {
                return Err(RoutingError::InvalidStructure(format!(
                    "method {verb} on '{url}' is missing a timeout"
                )));
            }
            if method.body_limit.is_empty() {
                return Err(RoutingError::InvalidStructure(format!(
                    "method {verb} on '{url}' is missing a body limit"
                )));
            }

            routes.push(FlattenedRoute {
                id: method.id,
                namespace_id: namespace.id,
                namespace: namespace.route.clone(),
                url: url.clone(),
                endpoint_url: method.endpoint_url.clone(),
                https: method.endpoint_protocol == EndpointProtocol::Https,
                method: method.method,
                deny_upload: method.deny_upload,
                body_limit: method.body_limit.clone(),
                auth_type: method.auth_type.clone(),
                timeout_ms: method.timeout_ms,
                integration_type: method.integration_type,
                mock_response_body: method.mock_response_body.clone(),
                mock_response_code: method.mock_response_code,
                mock_response_content: method.mock_response_content.clone(),
                order,
            });
            order += 1;
        }

        // Reverse push so siblings are visited in tree order.
        for child in node.children.iter().rev() {
            stack.push((child, url.clone()));
        }
    }

    Ok(routes)
}
