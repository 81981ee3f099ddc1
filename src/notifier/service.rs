//! Notification Service: owns one [`NotifierHandler`] per configured
//! chat channel, their worker tasks, and resolves `NotifierId` lookups for
//! the Executor.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RootConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::executor::registry::ProviderRegistry;
use crate::executor::seam::{Notifier, NotifierLookup, TaskExecutor};
use crate::ids::NotifierId;

use super::chat::ChatPlatform;
use super::commands::BotCommand;
use super::handler::{NotifierHandler, NotifierHandlerConfig, DEFAULT_QUEUE_CAPACITY};

/// Owns every configured Notifier's handler and worker task.
pub struct NotificationService {
    handlers: HashMap<NotifierId, Arc<NotifierHandler>>,
    default_notifier_id: NotifierId,
    workers: std::sync::Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl NotificationService {
    /// Build one handler per `config.notifiers` entry, each carrying the
    /// *same* bot command set: every task command with `notifier.usable =
    /// true` in `registry`/`config.tasks`, registered on every notifier
    /// unconditionally. `Notifier.Usable` gates whether a command is
    /// registered as a bot command at all, not which notifier channel(s)
    /// see it. A command's `default_notifier_id` is a routing hint for
    /// whichever external scheduler submits it on a schedule (out of scope
    /// here, see `CommandNotifierConfig::default_notifier_id`'s doc comment);
    /// it has no bearing on bot-command visibility. `chat_for` resolves the
    /// concrete [`ChatPlatform`] for a given notifier (e.g. one
    /// bot-token-scoped client per notifier, or a single shared client — the
    /// caller decides).
    pub fn build(
        config: &RootConfig,
        registry: &ProviderRegistry,
        cancel: CancellationToken,
    ) -> NotifyResult<Self> {
        let bot_commands = usable_bot_commands(config, registry);

        let mut handlers = HashMap::new();
        for notifier_cfg in &config.notifiers {
            let handler = NotifierHandler::build(NotifierHandlerConfig {
                id: notifier_cfg.id.clone(),
                chat_id: notifier_cfg.chat_id.clone(),
                supports_html: true,
                queue_capacity: DEFAULT_QUEUE_CAPACITY,
                commands: bot_commands.clone(),
            })?;
            handlers.insert(notifier_cfg.id.clone(), handler);
        }

        if !handlers.contains_key(&config.default_notifier_id) {
            return Err(NotifyError::NotifierNotFound(config.default_notifier_id.as_str().to_string()));
        }

        Ok(Self {
            handlers,
            default_notifier_id: config.default_notifier_id.clone(),
            workers: std::sync::Mutex::new(Vec::new()),
            cancel,
        })
    }

    pub fn default_notifier_id(&self) -> &NotifierId {
        &self.default_notifier_id
    }

    /// The handler registered for `id`, if any — mainly useful for
    /// inspecting a built service's bot command set in tests.
    pub fn handler(&self, id: &NotifierId) -> Option<&Arc<NotifierHandler>> {
        self.handlers.get(id)
    }

    /// Spawn every handler's `run` loop. `chat_for` resolves the concrete
    /// [`ChatPlatform`] for a given notifier — one bot-token-scoped client
    /// per notifier, or a shared client, as the caller prefers.
    pub fn spawn_all(
        &self,
        executor: Arc<dyn TaskExecutor>,
        chat_for: impl Fn(&NotifierId) -> Arc<dyn ChatPlatform>,
    ) {
        let mut workers = self.workers.lock().expect("workers mutex poisoned");
        for (id, handler) in &self.handlers {
            let chat = chat_for(id);
            let handler = Arc::clone(handler);
            let executor = Arc::clone(&executor);
            let cancel = self.cancel.clone();
            info!(notifier_id = %handler.id(), "spawning notifier worker");
            let join = tokio::spawn(async move {
                handler.run(chat, executor, cancel).await;
            });
            workers.push(join);
        }
    }

    /// Request every worker to stop and wait for them to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock().expect("workers mutex poisoned"));
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl NotifierLookup for NotificationService {
    fn get(&self, id: &NotifierId) -> Option<Arc<dyn Notifier>> {
        self.handlers
            .get(id)
            .map(|h| Arc::clone(h) as Arc<dyn Notifier>)
    }
}

fn usable_bot_commands(config: &RootConfig, registry: &ProviderRegistry) -> Vec<BotCommand> {
    let mut commands = Vec::new();
    for task in &config.tasks {
        if registry.get(&task.id).is_none() {
            continue;
        }
        for cmd in &task.commands {
            if !cmd.notifier.usable {
                continue;
            }
            commands.push(BotCommand {
                name: super::commands::derive_name(&task.id, &cmd.id),
                task_id: task.id.clone(),
                command_id: cmd.id.clone(),
                title: format!("{} > {}", task.title, cmd.title),
                description: cmd.description.clone(),
            });
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandConfig, CommandNotifierConfig, NotifierConfig, TaskConfig};
    use crate::ids::{CommandId, TaskId};
    use crate::provider::navershopping::NaverShoppingProvider;
    use crate::fetcher::ReqwestFetcher;

    fn sample_config() -> RootConfig {
        RootConfig {
            notifiers: vec![NotifierConfig {
                id: NotifierId::new("default"),
                bot_token: "t".into(),
                chat_id: "123".into(),
            }],
            default_notifier_id: NotifierId::new("default"),
            tasks: vec![TaskConfig {
                id: TaskId::new("navershopping"),
                title: "Naver Shopping".into(),
                data: serde_json::json!({"client_id": "a", "client_secret": "b"}),
                commands: vec![CommandConfig {
                    id: CommandId::new("watch_price"),
                    title: "Watch price".into(),
                    description: "Watch a product's price".into(),
                    notifier: CommandNotifierConfig {
                        usable: true,
                        default_notifier_id: None,
                    },
                    data: serde_json::json!({"query": "test", "filters": {"price_less_than": 1000}}),
                }],
            }],
        }
    }

    fn sample_registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        let fetcher = Arc::new(ReqwestFetcher::default());
        registry.register(Arc::new(NaverShoppingProvider::new(fetcher)));
        registry
    }

    #[test]
    fn build_derives_one_handler_per_notifier_with_usable_commands() {
        let config = sample_config();
        let registry = sample_registry();
        let service = NotificationService::build(&config, &registry, CancellationToken::new()).unwrap();
        assert_eq!(service.default_notifier_id(), &NotifierId::new("default"));
        assert!(service.get(&NotifierId::new("default")).is_some());
    }

    /// A `Notifier.Usable` command is registered on *every* configured
    /// notifier, not just the one named by `default_notifier_id` — that
    /// field routes scheduler-initiated runs, it does not gate bot-command
    /// visibility (see `NotificationService::build`'s doc comment).
    #[test]
    fn usable_command_is_registered_on_every_notifier_regardless_of_default_notifier_id() {
        let mut config = sample_config();
        config.notifiers.push(NotifierConfig {
            id: NotifierId::new("secondary"),
            bot_token: "t2".into(),
            chat_id: "456".into(),
        });
        config.tasks[0].commands[0].notifier.default_notifier_id = Some(NotifierId::new("default"));

        let registry = sample_registry();
        let service = NotificationService::build(&config, &registry, CancellationToken::new()).unwrap();

        for id in [NotifierId::new("default"), NotifierId::new("secondary")] {
            let handler = service.handler(&id).expect("notifier was configured");
            assert!(
                handler
                    .bot_commands()
                    .iter()
                    .any(|c| c.name == "navershopping_watch_price"),
                "expected notifier {id} to carry the usable bot command regardless of default_notifier_id"
            );
        }
    }

    #[test]
    fn build_rejects_unknown_default_notifier() {
        let mut config = sample_config();
        config.default_notifier_id = NotifierId::new("missing");
        let registry = sample_registry();
        assert!(matches!(
            NotificationService::build(&config, &registry, CancellationToken::new()),
            Err(NotifyError::NotifierNotFound(_))
        ));
    }
}
