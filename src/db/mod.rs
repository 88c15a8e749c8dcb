pub mod methods;
pub mod namespaces;
pub mod resources;
