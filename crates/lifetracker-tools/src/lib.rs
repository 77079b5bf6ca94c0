//! Tool and resource dispatch for the LifeTracker tables.

pub mod builtins;
pub mod context;
pub mod registry;
pub mod resource;
pub mod tool;

/// Built-in registries and registration helpers.
pub use builtins::{
    builtin_resource_registry, builtin_tool_registry, register_builtin_resources,
    register_builtin_tools,
};
/// Tool context and shared services.
pub use context::{ToolContext, ToolServices};
/// Tool registry type.
pub use registry::ToolRegistry;
/// Resource trait, spec and registry.
pub use resource::{Resource, ResourceRegistry, ResourceSpec, parse_resource_uri};
/// Tool trait and spec type.
pub use tool::{Tool, ToolSpec};
