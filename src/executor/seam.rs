//! The minimal interfaces the Executor needs into the Notifier and config
//! sides.
//!
//! Depending on these small traits rather than `notifier::service`/
//! `config::RootConfig` directly keeps `executor` free of a hard dependency
//! on either concrete subsystem, the same way it depends on trait seams
//! rather than concrete implementations elsewhere in this crate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NotifyResult;
use crate::ids::{CommandId, InstanceId, NotifierId, TaskId};

use super::types::{TaskContext, TaskSubmitRequest};

/// One addressable outbound channel, as seen by the Executor.
pub trait Notifier: Send + Sync {
    /// Non-blocking enqueue. `false` means the message was dropped (queue
    /// full or channel closed) — the Executor logs this but never retries.
    fn notify(&self, ctx: &TaskContext, message: &str) -> bool;

    /// Whether this channel accepts HTML-formatted bodies.
    fn supports_html(&self) -> bool;
}

/// Resolves a `NotifierId` to a live `Notifier`, without the Executor
/// knowing how the set of channels is managed.
pub trait NotifierLookup: Send + Sync {
    fn get(&self, id: &NotifierId) -> Option<Arc<dyn Notifier>>;
}

/// The minimal interface a Notifier needs into the Executor: submit a run,
/// cancel a live one. Depending on this rather than the concrete `Executor`
/// keeps `notifier` free of a hard dependency on `executor`.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn submit_task(&self, req: TaskSubmitRequest) -> NotifyResult<InstanceId>;

    async fn cancel_task(&self, instance_id: &InstanceId) -> NotifyResult<()>;
}

/// Resolves the `Data` blobs a provider validates and runs against, keyed by
/// `(TaskId, CommandId)`. Depending on this rather than `RootConfig` directly
/// keeps `Executor` free of a hard dependency on the config surface, the same
/// way it depends on `NotifierLookup` rather than `NotificationService`.
pub trait ExecutorConfigSource: Send + Sync {
    /// The task-level `Data` blob, or `Value::Null` if `task_id` is unknown.
    fn task_data(&self, task_id: &TaskId) -> serde_json::Value;

    /// The command-level `Data` blob, or `Value::Null` if `task_id`/`command_id`
    /// is unknown.
    fn command_data(&self, task_id: &TaskId, command_id: &CommandId) -> serde_json::Value;
}

/// An `ExecutorConfigSource` with nothing configured. Useful in tests that
/// exercise providers whose `validate_settings` tolerates empty data.
pub struct NullConfigSource;

impl ExecutorConfigSource for NullConfigSource {
    fn task_data(&self, _task_id: &TaskId) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn command_data(&self, _task_id: &TaskId, _command_id: &CommandId) -> serde_json::Value {
        serde_json::Value::Null
    }
}
