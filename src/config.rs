//! Declarative configuration surface.
//!
//! Loading these from a file, watching for changes, or decoding an
//! arbitrary untyped map is explicitly out of scope — these types only
//! describe the *shape* an external loader must produce.
//! A test fixture, a literal `serde_json::json!` value, or a real config
//! file all land here the same way, via `serde::Deserialize`.

use serde::{Deserialize, Serialize};

use crate::executor::seam::ExecutorConfigSource;
use crate::ids::{CommandId, NotifierId, TaskId};

/// Top-level config surface: notifiers, the default notifier, and tasks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RootConfig {
    pub notifiers: Vec<NotifierConfig>,
    pub default_notifier_id: NotifierId,
    pub tasks: Vec<TaskConfig>,
}

impl RootConfig {
    /// Look up a notifier's declared config by ID.
    pub fn notifier(&self, id: &NotifierId) -> Option<&NotifierConfig> {
        self.notifiers.iter().find(|n| &n.id == id)
    }

    /// Look up a task's declared config by ID.
    pub fn task(&self, id: &TaskId) -> Option<&TaskConfig> {
        self.tasks.iter().find(|t| &t.id == id)
    }
}

impl ExecutorConfigSource for RootConfig {
    fn task_data(&self, task_id: &TaskId) -> serde_json::Value {
        self.task(task_id).map(|t| t.data.clone()).unwrap_or(serde_json::Value::Null)
    }

    fn command_data(&self, task_id: &TaskId, command_id: &CommandId) -> serde_json::Value {
        self.task(task_id)
            .and_then(|t| t.commands.iter().find(|c| &c.id == command_id))
            .map(|c| c.data.clone())
            .unwrap_or(serde_json::Value::Null)
    }
}

/// One chat-channel endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    pub id: NotifierId,
    pub bot_token: String,
    pub chat_id: String,
}

/// One registered task: an identifier, a human title, provider-level `Data`,
/// and its commands.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskConfig {
    pub id: TaskId,
    pub title: String,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    pub commands: Vec<CommandConfig>,
}

/// One command within a task.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandConfig {
    pub id: CommandId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub notifier: CommandNotifierConfig,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

/// Per-command notifier-facing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandNotifierConfig {
    /// Whether this (task, command) should be registered as a bot command.
    #[serde(default)]
    pub usable: bool,
    /// Which notifier receives scheduler-initiated runs of this command,
    /// when not otherwise specified by the caller. A routing hint for the
    /// (external) scheduler only — it does not restrict which notifier
    /// channels register this command as a bot command; see
    /// `NotificationService::build`.
    pub default_notifier_id: Option<NotifierId>,
}

impl Default for CommandNotifierConfig {
    fn default() -> Self {
        Self {
            usable: false,
            default_notifier_id: None,
        }
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_config_deserializes_from_declarative_json() {
        let json = serde_json::json!({
            "notifiers": [
                {"id": "default", "bot_token": "t", "chat_id": "123"}
            ],
            "default_notifier_id": "default",
            "tasks": [
                {
                    "id": "navershopping",
                    "title": "Naver Shopping",
                    "data": {"client_id": "a", "client_secret": "b"},
                    "commands": [
                        {
                            "id": "watch_price",
                            "title": "Watch price",
                            "description": "Watch a product's price",
                            "notifier": {"usable": true},
                            "data": {"query": "test"}
                        }
                    ]
                }
            ]
        });

        let cfg: RootConfig = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.notifiers.len(), 1);
        assert_eq!(cfg.tasks[0].commands[0].notifier.usable, true);
        assert!(cfg.task(&TaskId::new("navershopping")).is_some());
    }

    #[test]
    fn executor_config_source_resolves_known_and_unknown_keys() {
        let cfg = RootConfig {
            notifiers: Vec::new(),
            default_notifier_id: NotifierId::new("default"),
            tasks: vec![TaskConfig {
                id: TaskId::new("navershopping"),
                title: "Naver Shopping".into(),
                data: serde_json::json!({"client_id": "a", "client_secret": "b"}),
                commands: vec![CommandConfig {
                    id: CommandId::new("watch_price"),
                    title: "Watch price".into(),
                    description: "Watch a product's price".into(),
                    notifier: CommandNotifierConfig::default(),
                    data: serde_json::json!({"query": "test"}),
                }],
            }],
        };

        assert_eq!(
            ExecutorConfigSource::task_data(&cfg, &TaskId::new("navershopping")),
            serde_json::json!({"client_id": "a", "client_secret": "b"})
        );
        assert_eq!(
            ExecutorConfigSource::command_data(&cfg, &TaskId::new("navershopping"), &CommandId::new("watch_price")),
            serde_json::json!({"query": "test"})
        );
        assert_eq!(ExecutorConfigSource::task_data(&cfg, &TaskId::new("missing")), serde_json::Value::Null);
        assert_eq!(
            ExecutorConfigSource::command_data(&cfg, &TaskId::new("navershopping"), &CommandId::new("missing")),
            serde_json::Value::Null
        );
    }

    #[test]
    fn command_notifier_config_defaults_to_unusable() {
        let json = serde_json::json!({
            "id": "internal",
            "title": "Internal",
            "description": "not bot-exposed"
        });
        let cmd: CommandConfig = serde_json::from_value(json).unwrap();
        assert!(!cmd.notifier.usable);
    }
}
