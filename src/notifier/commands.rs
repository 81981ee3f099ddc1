//! Bot command namespace: deriving `/task_command`-style names
//! from registered `(TaskId, CommandId)` pairs, and parsing inbound text
//! into the three recognized command shapes.

use std::collections::HashMap;

use crate::error::{NotifyError, NotifyResult};
use crate::ids::{CommandId, InstanceId, TaskId};
use crate::strings::snake_case;

/// One task command exposed to chat users, with its derived name and
/// composite display title.
#[derive(Debug, Clone)]
pub struct BotCommand {
    pub name: String,
    pub task_id: TaskId,
    pub command_id: CommandId,
    pub title: String,
    pub description: String,
}

/// The derived bot-command name for a `(TaskId, CommandId)` pair:
/// `snake_case(task_id) + "_" + snake_case(command_id)`.
pub fn derive_name(task_id: &TaskId, command_id: &CommandId) -> String {
    format!("{}_{}", snake_case(task_id.as_str()), snake_case(command_id.as_str()))
}

/// Build the name → command table for one Notifier, rejecting on the first
/// derived-name collision — a config bug an operator must see at startup,
/// not a later runtime surprise.
pub fn build_registry(commands: Vec<BotCommand>) -> NotifyResult<HashMap<String, BotCommand>> {
    let mut table = HashMap::new();
    for cmd in commands {
        if let Some(existing) = table.insert(cmd.name.clone(), cmd) {
            return Err(NotifyError::DuplicateCommand(existing.name));
        }
    }
    Ok(table)
}

/// One parsed inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    Help,
    Cancel(InstanceId),
    /// Malformed `/cancel...` text that didn't match `/cancel_<id>`.
    InvalidCancel,
    /// A registered task command, by its derived name.
    Task(String),
    /// Well-formed as a command (`/...`) but not one this notifier knows.
    Unknown,
}

const CANCEL_PREFIX: &str = "/cancel_";

/// Parse inbound text into a command. Anything not starting with `/` is the
/// caller's responsibility to treat as a non-command message.
pub fn parse(text: &str, known: &HashMap<String, BotCommand>) -> ParsedCommand {
    debug_assert!(text.starts_with('/'));

    if text == "/help" {
        return ParsedCommand::Help;
    }

    if let Some(rest) = text.strip_prefix(CANCEL_PREFIX) {
        return if rest.is_empty() {
            ParsedCommand::InvalidCancel
        } else {
            ParsedCommand::Cancel(InstanceId::new(rest))
        };
    }
    if text.starts_with("/cancel") {
        return ParsedCommand::InvalidCancel;
    }

    let name = text.trim_start_matches('/');
    if known.contains_key(name) {
        ParsedCommand::Task(name.to_string())
    } else {
        ParsedCommand::Unknown
    }
}
