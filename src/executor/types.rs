//! Request/context value types that cross the Executor/Notifier boundary.

use std::time::Duration;

use crate::ids::{CommandId, InstanceId, NotifierId, RunBy, TaskId};

/// A submission, either from the scheduler or from a Notifier translating an
/// inbound chat command.
#[derive(Debug, Clone)]
pub struct TaskSubmitRequest {
    pub task_id: TaskId,
    pub command_id: CommandId,
    pub notifier_id: NotifierId,
    pub run_by: RunBy,
    /// Emit a "task started" message before the provider runs, when
    /// `run_by == RunBy::User`.
    pub notify_on_start: bool,
}

/// Bag of optional fields the Executor threads through a run and hands to
/// the Notifier with every outbound message. Never serialized — in-process
/// only, dropped after the terminal notification call returns.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    pub title: Option<String>,
    pub task_id: Option<TaskId>,
    pub command_id: Option<CommandId>,
    pub instance_id: Option<InstanceId>,
    pub elapsed_time_after_run: Option<Duration>,
    pub cancelable: bool,
    pub error_occurred: bool,
}

impl TaskContext {
    pub fn started(task_id: TaskId, command_id: CommandId, instance_id: InstanceId) -> Self {
        Self {
            task_id: Some(task_id),
            command_id: Some(command_id),
            instance_id: Some(instance_id),
            cancelable: true,
            ..Default::default()
        }
    }

    pub fn finished(
        task_id: TaskId,
        command_id: CommandId,
        instance_id: InstanceId,
        elapsed: Duration,
        error_occurred: bool,
    ) -> Self {
        Self {
            task_id: Some(task_id),
            command_id: Some(command_id),
            instance_id: Some(instance_id),
            elapsed_time_after_run: Some(elapsed),
            cancelable: false,
            error_occurred,
            ..Default::default()
        }
    }
}
