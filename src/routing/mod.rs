pub mod flatten;
pub mod tree;

pub use flatten::{flatten, FlattenedRoute};
pub use tree::{build_tree, ResourceNode};

/// Structural violation found while compiling a namespace's route tree.
/// Aborts the flatten for that namespace only; other namespaces still deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    InvalidStructure(String),
}

impl std::fmt::Display for RoutingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingError::InvalidStructure(msg) => {
                write!(f, "invalid routing structure: {msg}")
            }
        }
    }
}

impl std::error::Error for RoutingError {}
