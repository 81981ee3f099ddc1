//! Opaque identifier newtypes and the `RunBy` classification.
//!
//! Plain `String` parameters are easy to transpose at a call site
//! (`submit(task_id, command_id)` vs `submit(command_id, task_id)`). These
//! newtypes close that hole for the identifiers that flow through the
//! executor and notifier boundary.

use std::fmt;

macro_rules! opaque_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a `String` (or anything `Into<String>`) as this ID type.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_id!(TaskId, "Identifies a registered task (e.g. `navershopping`).");
opaque_id!(CommandId, "Identifies a command within a task (e.g. `watch_price`).");
opaque_id!(
    InstanceId,
    "Identifies one live execution. Assigned when a submission is accepted."
);
opaque_id!(NotifierId, "Identifies a registered chat-notifier channel.");

impl InstanceId {
    /// Allocate a fresh, process-unique instance ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Key identifying one (task, command) pair for the executor's live-set and
/// the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskCommandKey {
    pub task_id: TaskId,
    pub command_id: CommandId,
}

impl TaskCommandKey {
    pub fn new(task_id: TaskId, command_id: CommandId) -> Self {
        Self { task_id, command_id }
    }
}

impl fmt::Display for TaskCommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.task_id, self.command_id)
    }
}

/// Who initiated a run: the scheduler (silent), a user through a notifier
/// (expects feedback), or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunBy {
    Scheduler,
    User,
    #[default]
    Unknown,
}

impl fmt::Display for RunBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunBy::Scheduler => "scheduler",
            RunBy::User => "user",
            RunBy::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_not_interchangeable_types() {
        let t = TaskId::new("ns");
        let c = CommandId::new("watch_price");
        assert_eq!(t.as_str(), "ns");
        assert_eq!(c.as_str(), "watch_price");
        // Compile-time: `t == c` would not type-check, which is the point.
    }

    #[test]
    fn instance_id_generate_is_unique() {
        let a = InstanceId::generate();
        let b = InstanceId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn run_by_defaults_to_unknown() {
        assert_eq!(RunBy::default(), RunBy::Unknown);
    }

    #[test]
    fn task_command_key_display() {
        let key = TaskCommandKey::new(TaskId::new("ns"), CommandId::new("watch"));
        assert_eq!(key.to_string(), "ns/watch");
    }
}
