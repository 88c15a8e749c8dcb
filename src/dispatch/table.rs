use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::Method as Verb;

use crate::models::HttpMethod;
use crate::routing::FlattenedRoute;

use super::handler::RouteHandler;

/// One mounted route: a URL prefix plus its compiled handler.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub url: String,
    pub method: HttpMethod,
    pub auth_type: String,
    pub namespace: String,
    pub handler: RouteHandler,
}

impl RouteEntry {
    pub fn compile(route: &FlattenedRoute) -> Self {
        Self {
            url: route.url.clone(),
            method: route.method,
            auth_type: route.auth_type.clone(),
            namespace: route.namespace.clone(),
            handler: RouteHandler::compile(route),
        }
    }
}

/// The live routing table. Read lock-free on every request; `replace`
/// swaps in a fully built list so readers never see partial state.
pub struct DispatchTable {
    routes: ArcSwap<Vec<RouteEntry>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn replace(&self, routes: Vec<RouteEntry>) {
        self.routes.store(Arc::new(routes));
    }

    pub fn load(&self) -> Arc<Vec<RouteEntry>> {
        self.routes.load_full()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a request against the table in registration order; first match
/// wins when prefixes overlap.
///
/// Mock routes serve any verb but only at their exact URL, so a root mock
/// does not swallow its child mounts. Proxy routes also match requests that
/// extend their URL on a segment boundary; the trailing segments become the
/// wildcard captures handed to path-parameter substitution. A proxy route
/// whose verb doesn't match (`ANY` matches everything) falls through to
/// later entries.
pub fn resolve<'a, 'p>(
    routes: &'a [RouteEntry],
    path: &'p str,
    verb: &Verb,
) -> Option<(&'a RouteEntry, Vec<&'p str>)> {
    for entry in routes {
        let Some(wildcards) = match_path(&entry.url, path) else {
            continue;
        };
        match entry.handler {
            RouteHandler::Mock(_) => {
                if wildcards.is_empty() {
                    return Some((entry, wildcards));
                }
            }
            RouteHandler::Proxy(_) => {
                if verb_matches(entry.method, verb) {
                    return Some((entry, wildcards));
                }
            }
        }
    }
    None
}

fn verb_matches(route: HttpMethod, incoming: &Verb) -> bool {
    route == HttpMethod::Any || incoming.as_str() == route.as_str()
}

fn match_path<'p>(mount: &str, path: &'p str) -> Option<Vec<&'p str>> {
    let rest = path.strip_prefix(mount)?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_prefix('/')?;
    if rest.is_empty() {
        Some(Vec::new())
    } else {
        Some(rest.split('/').collect())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::dispatch::handler::{MockRoute, ProxyRoute};

    fn mock_entry(url: &str) -> RouteEntry {
        RouteEntry {
            url: url.to_string(),
            method: HttpMethod::Get,
            auth_type: "none".to_string(),
            namespace: "crm".to_string(),
            handler: RouteHandler::Mock(MockRoute {
                status: StatusCode::OK,
                content_type: "application/json".to_string(),
                body: "{}".to_string(),
            }),
        }
    }

    fn proxy_entry(url: &str, method: HttpMethod) -> RouteEntry {
        RouteEntry {
            url: url.to_string(),
            method,
            auth_type: "none".to_string(),
            namespace: "crm".to_string(),
            handler: RouteHandler::Proxy(ProxyRoute {
                endpoint_url: "http://svc/users".to_string(),
                https: false,
                deny_upload: false,
                body_limit: 1024,
                timeout: std::time::Duration::from_secs(5),
            }),
        }
    }

    #[test]
    fn matches_exact_path() {
        let routes = vec![mock_entry("/crm/users")];
        let (entry, wildcards) = resolve(&routes, "/crm/users", &Verb::GET).unwrap();
        assert_eq!(entry.url, "/crm/users");
        assert!(wildcards.is_empty());
    }

    #[test]
    fn captures_trailing_segments_as_wildcards() {
        let routes = vec![proxy_entry("/crm/users", HttpMethod::Get)];
        let (_, wildcards) = resolve(&routes, "/crm/users/42/detail", &Verb::GET).unwrap();
        assert_eq!(wildcards, vec!["42", "detail"]);
    }

    #[test]
    fn only_matches_on_segment_boundaries() {
        let routes = vec![proxy_entry("/crm/users", HttpMethod::Get)];
        assert!(resolve(&routes, "/crm/users2", &Verb::GET).is_none());
        assert!(resolve(&routes, "/crm/user", &Verb::GET).is_none());
    }

    #[test]
    fn mock_routes_match_any_verb() {
        let routes = vec![mock_entry("/crm")];
        for verb in [Verb::GET, Verb::POST, Verb::PUT, Verb::PATCH, Verb::DELETE] {
            assert!(resolve(&routes, "/crm", &verb).is_some());
        }
    }

    #[test]
    fn mock_routes_do_not_swallow_child_mounts() {
        let routes = vec![mock_entry("/crm"), proxy_entry("/crm/users", HttpMethod::Get)];
        let (entry, wildcards) = resolve(&routes, "/crm/users/42", &Verb::GET).unwrap();
        assert_eq!(entry.url, "/crm/users");
        assert_eq!(wildcards, vec!["42"]);
    }

    #[test]
    fn proxy_routes_filter_by_verb() {
        let routes = vec![proxy_entry("/crm/users", HttpMethod::Post)];
        assert!(resolve(&routes, "/crm/users", &Verb::POST).is_some());
        assert!(resolve(&routes, "/crm/users", &Verb::GET).is_none());
    }

    #[test]
    fn proxy_any_matches_every_verb() {
        let routes = vec![proxy_entry("/crm/users", HttpMethod::Any)];
        for verb in [Verb::GET, Verb::POST, Verb::DELETE] {
            assert!(resolve(&routes, "/crm/users", &verb).is_some());
        }
    }

    #[test]
    fn verb_mismatch_falls_through_to_later_entries() {
        let routes = vec![
            proxy_entry("/crm/users", HttpMethod::Post),
            proxy_entry("/crm", HttpMethod::Get),
        ];
        let (entry, wildcards) = resolve(&routes, "/crm/users", &Verb::GET).unwrap();
        assert_eq!(entry.url, "/crm");
        assert_eq!(wildcards, vec!["users"]);
    }

    #[test]
    fn first_registered_proxy_wins_on_overlapping_prefixes() {
        let routes = vec![
            proxy_entry("/crm", HttpMethod::Any),
            proxy_entry("/crm/users", HttpMethod::Any),
        ];
        let (entry, wildcards) = resolve(&routes, "/crm/users", &Verb::GET).unwrap();
        assert_eq!(entry.url, "/crm");
        assert_eq!(wildcards, vec!["users"]);
    }

    #[test]
    fn replace_swaps_the_whole_table() {
        let table = DispatchTable::new();
        assert!(table.load().is_empty());

        table.replace(vec![mock_entry("/crm")]);
        let before = table.load();
        assert_eq!(before.len(), 1);

        table.replace(vec![mock_entry("/erp"), mock_entry("/erp/items")]);
        // The old snapshot is untouched; new loads see the new table.
        assert_eq!(before.len(), 1);
        assert_eq!(table.load().len(), 2);
        assert_eq!(table.load()[0].url, "/erp");
    }
}
