pub mod method;
pub mod namespace;
pub mod resource;

pub use method::{EndpointProtocol, HttpMethod, IntegrationType, Method};
pub use namespace::{Namespace, NamespaceKind};
pub use resource::Resource;
