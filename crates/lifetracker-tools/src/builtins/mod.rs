//! Built-in LifeTracker tools and resources.

mod activity;
mod memory;
mod profile;
mod quick_action;
mod resources;
mod utils;

use crate::{ResourceRegistry, ToolRegistry};
use log::info;
use std::sync::Arc;

pub use activity::{
    CreateActivityLogTool, CreateExerciseActivityLogTool, CreateFoodOrDrinkActivityLogTool,
    GetActivityLogsTool,
};
pub use memory::{CreateMemoryEntryTool, GetMemoryEntriesTool};
pub use profile::{CreateUserProfileTool, GetUserProfileTool, UpdateUserProfileTool};
pub use quick_action::{CreateQuickActionTool, GetQuickActionsTool};
pub use resources::{ProfileResource, RecentActivitiesResource};

/// Register all built-in tools with the provided registry.
pub fn register_builtin_tools(registry: &ToolRegistry) {
    registry.register(Arc::new(CreateActivityLogTool));
    registry.register(Arc::new(CreateFoodOrDrinkActivityLogTool));
    registry.register(Arc::new(CreateExerciseActivityLogTool));
    registry.register(Arc::new(GetActivityLogsTool));
    registry.register(Arc::new(CreateUserProfileTool));
    registry.register(Arc::new(UpdateUserProfileTool));
    registry.register(Arc::new(GetUserProfileTool));
    registry.register(Arc::new(CreateMemoryEntryTool));
    registry.register(Arc::new(GetMemoryEntriesTool));
    registry.register(Arc::new(CreateQuickActionTool));
    registry.register(Arc::new(GetQuickActionsTool));
    info!("registered built-in tools");
}

/// Build a registry pre-populated with built-in tools.
pub fn builtin_tool_registry() -> ToolRegistry {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry);
    registry
}

/// Register the owner-scoped resources.
pub fn register_builtin_resources(registry: &ResourceRegistry) {
    registry.register(Arc::new(ProfileResource));
    registry.register(Arc::new(RecentActivitiesResource));
    info!("registered built-in resources");
}

/// Build a registry pre-populated with built-in resources.
pub fn builtin_resource_registry() -> ResourceRegistry {
    let registry = ResourceRegistry::new();
    register_builtin_resources(&registry);
    registry
}


#[cfg(test)]
mod tests {
    use super::{builtin_resource_registry, builtin_tool_registry};
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_catalogue_is_complete() {
        assert_eq!(
            builtin_tool_registry().list(),
            vec![
                "create_activity_log",
                "create_exercise_activity_log",
                "create_food_or_drink_activity_log",
                "create_memory_entry",
                "create_quick_action",
                "create_user_profile",
                "get_activity_logs",
                "get_memory_entries",
                "get_quick_actions",
                "get_user_profile",
                "update_user_profile",
            ]
        );
        let templates: Vec<String> = builtin_resource_registry()
            .specs()
            .into_iter()
            .map(|spec| spec.uri_template)
            .collect();
        assert_eq!(templates, vec!["profile://{owner}", "recent-activities://{owner}"]);
    }
}
