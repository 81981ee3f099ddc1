//! Task Provider contract.
//!
//! A provider is a stateful unit registered under one `TaskId`, offering one
//! or more commands. The Executor owns scheduling, admission, and
//! persistence; a provider only knows how to run one command, given the
//! previous snapshot, and produce a message plus (optionally) a new one.

pub mod navershopping;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{NotifyError, NotifyResult};
use crate::ids::{CommandId, InstanceId, RunBy, TaskId};

/// Per-command registration metadata a provider advertises at startup.
#[derive(Clone)]
pub struct ProviderCommandConfig {
    pub id: CommandId,
    /// `false` forbids a second live instance of this (task, command).
    pub allow_multiple: bool,
    /// Factory for the empty snapshot of the correct shape — used when no
    /// prior snapshot exists and a provider wants a typed zero value rather
    /// than threading `Option` through its own comparison logic.
    pub new_snapshot: Arc<dyn Fn() -> serde_json::Value + Send + Sync>,
}

impl ProviderCommandConfig {
    pub fn new(
        id: CommandId,
        allow_multiple: bool,
        new_snapshot: impl Fn() -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            allow_multiple,
            new_snapshot: Arc::new(new_snapshot),
        }
    }
}

impl std::fmt::Debug for ProviderCommandConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCommandConfig")
            .field("id", &self.id)
            .field("allow_multiple", &self.allow_multiple)
            .finish()
    }
}

/// Shared per-run backbone passed to every provider invocation: request
/// identity, who triggered the run, and cancellation.
#[derive(Clone)]
pub struct TaskBase {
    pub task_id: TaskId,
    pub command_id: CommandId,
    pub instance_id: InstanceId,
    pub run_by: RunBy,
    pub cancel: CancellationToken,
}

impl TaskBase {
    /// `Err(NotifyError::Canceled)` iff cancellation has been requested;
    /// providers call this between page fetches and between tight-loop
    /// items, per the concurrency model's suspension-point contract.
    pub fn check_cancel(&self) -> NotifyResult<()> {
        if self.cancel.is_cancelled() {
            Err(NotifyError::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Result of one provider run.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    /// Rendered notification body. Empty means nothing is forwarded.
    pub message: String,
    /// Whether the provider observed a change worth persisting.
    pub should_save: bool,
    /// The new full snapshot, when the provider has one to offer. Only
    /// persisted when paired with `should_save = true` — see the
    /// consistency check in `executor::run_submission`.
    pub snapshot: Option<serde_json::Value>,
}

impl ProviderOutcome {
    pub fn silent_no_change() -> Self {
        Self {
            message: String::new(),
            should_save: false,
            snapshot: None,
        }
    }
}

/// A registered task: one `TaskId`, one or more commands, one execution
/// entry point.
#[async_trait]
pub trait TaskProvider: Send + Sync {
    fn task_id(&self) -> &TaskId;

    fn command_configs(&self) -> &[ProviderCommandConfig];

    fn command_config(&self, command_id: &CommandId) -> Option<&ProviderCommandConfig> {
        self.command_configs().iter().find(|c| &c.id == command_id)
    }

    /// Decode and validate the task-level and command-level settings,
    /// without running anything. The Executor calls this before admitting
    /// an instance (step 2 of the submission algorithm) so malformed
    /// settings reject the submission with `InvalidInput` instead of
    /// consuming a live-set slot.
    fn validate_settings(
        &self,
        task_data: &serde_json::Value,
        command_data: &serde_json::Value,
    ) -> NotifyResult<()>;

    /// Run one command. `task_data`/`command_data` are the provider's own
    /// config `Data` blobs, decoded by the provider itself (via
    /// `crate::decode::from_value`). `prev_snapshot` is `None` on first run.
    async fn run(
        &self,
        base: &TaskBase,
        task_data: &serde_json::Value,
        command_data: &serde_json::Value,
        prev_snapshot: Option<serde_json::Value>,
        supports_html: bool,
    ) -> NotifyResult<ProviderOutcome>;
}
