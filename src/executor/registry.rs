//! Explicit provider registry (replaces process-wide
//! registration at import with a registry built once at startup and handed
//! to `Executor::new`).

use std::collections::HashMap;
use std::sync::Arc;

use crate::ids::{CommandId, TaskId};
use crate::provider::TaskProvider;

/// Immutable once constructed — populate fully, then pass to `Executor::new`.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<TaskId, Arc<dyn TaskProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own `task_id()`. Registering a second
    /// provider under an already-used `TaskId` replaces the first —
    /// callers build the registry once, linearly, at startup.
    pub fn register(&mut self, provider: Arc<dyn TaskProvider>) -> &mut Self {
        self.providers.insert(provider.task_id().clone(), provider);
        self
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&Arc<dyn TaskProvider>> {
        self.providers.get(task_id)
    }

    pub fn contains_command(&self, task_id: &TaskId, command_id: &CommandId) -> bool {
        self.providers
            .get(task_id)
            .map(|p| p.command_config(command_id).is_some())
            .unwrap_or(false)
    }

    /// Every `(TaskId, CommandId)` pair across all registered providers, for
    /// bot-command registration and namespace-collision detection.
    pub fn all_task_commands(&self) -> Vec<(TaskId, CommandId)> {
        self.providers
            .iter()
            .flat_map(|(task_id, provider)| {
                provider
                    .command_configs()
                    .iter()
                    .map(move |c| (task_id.clone(), c.id.clone()))
            })
            .collect()
    }
}
