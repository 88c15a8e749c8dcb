use std::collections::HashMap;

use crate::models::{Method, Resource};

use super::RoutingError;

/// A resource with its methods and child resources attached. Built fresh for
/// each flatten, never persisted.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub resource: Resource,
    pub methods: Vec<Method>,
    pub children: Vec<ResourceNode>,
}

/// Assemble a namespace's flat resource records into its rooted tree.
///
/// Input order is irrelevant; sibling order in the tree follows the input
/// order (the store lists resources in creation order). A namespace must
/// have exactly one root, and every resource must be reachable from it: a
/// `parent_id` pointing at a nonexistent resource, or a parent cycle, is a
/// structural error rather than a silently dropped subtree.
pub fn build_tree(
    resources: Vec<Resource>,
    methods: Vec<Method>,
) -> Result<ResourceNode, RoutingError> {
    let mut methods_by_resource: HashMap<_, Vec<Method>> = HashMap::new();
    for method in methods {
        methods_by_resource
            .entry(method.resource_id)
            .or_default()
            .push(method);
    }

    let mut roots = Vec::new();
    let mut by_parent: HashMap<_, Vec<Resource>> = HashMap::new();
    for resource in resources {
        match resource.parent_id {
            None => roots.push(resource),
            Some(parent_id) => by_parent.entry(parent_id).or_default().push(resource),
        }
    }

    if roots.len() > 1 {
        return Err(RoutingError::InvalidStructure(format!(
            "namespace has {} root resources, expected exactly one",
            roots.len()
        )));
    }
    let Some(root) = roots.pop() else {
        return Err(RoutingError::InvalidStructure(
            "namespace has no root resource".to_string(),
        ));
    };

    // Pre-order listing via an explicit worklist; children are pushed in
    // reverse so they pop in creation order.
    let mut preorder = Vec::new();
    let mut stack = vec![root];
    while let Some(resource) = stack.pop() {
        if let Some(mut children) = by_parent.remove(&resource.id) {
            children.reverse();
            stack.extend(children);
        }
        preorder.push(resource);
    }

    if !by_parent.is_empty() {
        let mut orphaned: Vec<String> = by_parent
            .values()
            .flatten()
            .map(|r| format!("'{}'", r.path))
            .collect();
        orphaned.sort();
        return Err(RoutingError::InvalidStructure(format!(
            "resources {} reference a missing or unreachable parent",
            orphaned.join(", ")
        )));
    }

    // Reverse pre-order visits every child before its parent, so subtrees
    // can be assembled bottom-up without recursion.
    let mut built: HashMap<_, Vec<ResourceNode>> = HashMap::new();
    let mut tree = None;
    for resource in preorder.into_iter().rev() {
        let mut children = built.remove(&resource.id).unwrap_or_default();
        children.reverse();
        let node = ResourceNode {
            methods: methods_by_resource.remove(&resource.id).unwrap_or_default(),
            children,
            resource,
        };
        match node.resource.parent_id {
            Some(parent_id) => built.entry(parent_id).or_default().push(node),
            None => tree = Some(node),
        }
    }

    tree.ok_or_else(|| {
        RoutingError::InvalidStructure("namespace has no root resource".to_string())
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::{EndpointProtocol, HttpMethod, IntegrationType};

    fn resource(id: Uuid, namespace_id: Uuid, parent_id: Option<Uuid>, path: &str) -> Resource {
        Resource {
            id,
            namespace_id,
            parent_id,
            path: path.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn mock_method(resource_id: Uuid) -> Method {
        Method {
            id: Uuid::new_v4(),
            resource_id,
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
            mock_response_body: "{}".to_string(),
            mock_response_code: 200,
            mock_response_content: "application/json".to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn collect_ids(node: &ResourceNode, out: &mut Vec<Uuid>) {
        out.push(node.resource.id);
        for child in &node.children {
            collect_ids(child, out);
        }
    }

    #[test]
    fn round_trips_every_resource_exactly_once() {
        let ns = Uuid::new_v4();
        let root = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let leaf = Uuid::new_v4();

        // Children listed before their parents on purpose.
        let resources = vec![
            resource(leaf, ns, Some(a), "deep"),
            resource(a, ns, Some(root), "users"),
            resource(b, ns, Some(root), "orders"),
            resource(root, ns, None, ""),
        ];
        let methods = vec![mock_method(root), mock_method(a), mock_method(b)];

        let tree = build_tree(resources, methods).unwrap();
        let mut ids = Vec::new();
        collect_ids(&tree, &mut ids);

        let mut expected = vec![root, a, b, leaf];
        ids.sort();
        expected.sort();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids, expected);
    }

    #[test]
    fn sibling_order_follows_input_order() {
        let ns = Uuid::new_v4();
        let root = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let resources = vec![
            resource(root, ns, None, ""),
            resource(first, ns, Some(root), "alpha"),
            resource(second, ns, Some(root), "beta"),
        ];

        let tree = build_tree(resources, vec![]).unwrap();
        let paths: Vec<_> = tree.children.iter().map(|c| c.resource.path.clone()).collect();
        assert_eq!(paths, vec!["alpha", "beta"]);
    }

    #[test]
    fn attaches_methods_to_owning_resource() {
        let ns = Uuid::new_v4();
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();

        let resources = vec![
            resource(root, ns, None, ""),
            resource(child, ns, Some(root), "users"),
        ];
        let methods = vec![mock_method(child), mock_method(root), mock_method(child)];

        let tree = build_tree(resources, methods).unwrap();
        assert_eq!(tree.methods.len(), 1);
        assert_eq!(tree.children[0].methods.len(), 2);
    }

    #[test]
    fn rejects_missing_root() {
        let ns = Uuid::new_v4();
        let a = Uuid::new_v4();
        let err = build_tree(vec![resource(a, ns, Some(Uuid::new_v4()), "users")], vec![])
            .unwrap_err();
        assert!(err.to_string().contains("no root"));
    }

    #[test]
    fn rejects_multiple_roots() {
        let ns = Uuid::new_v4();
        let resources = vec![
            resource(Uuid::new_v4(), ns, None, ""),
            resource(Uuid::new_v4(), ns, None, "other"),
        ];
        let err = build_tree(resources, vec![]).unwrap_err();
        assert!(err.to_string().contains("2 root resources"));
    }

    #[test]
    fn rejects_dangling_parent_reference() {
        let ns = Uuid::new_v4();
        let root = Uuid::new_v4();
        let resources = vec![
            resource(root, ns, None, ""),
            resource(Uuid::new_v4(), ns, Some(Uuid::new_v4()), "lost"),
        ];
        let err = build_tree(resources, vec![]).unwrap_err();
        assert!(err.to_string().contains("'lost'"));
        assert!(err.to_string().contains("missing or unreachable parent"));
    }

    #[test]
    fn rejects_parent_cycle() {
        let ns = Uuid::new_v4();
        let root = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let resources = vec![
            resource(root, ns, None, ""),
            resource(a, ns, Some(b), "a"),
            resource(b, ns, Some(a), "b"),
        ];
        let err = build_tree(resources, vec![]).unwrap_err();
        assert!(err.to_string().contains("missing or unreachable parent"));
    }
}
