//! End-to-end wiring: `NotificationService` + `NotifierHandler` +
//! `ChatPlatform` + `Executor`, driven entirely through the public API a
//! real deployment would use (no whitebox access to executor/notifier
//! internals). Exercises bot command dispatch, `/help`, chat-isolation, and
//! the cancel deep-link round trip.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use notify_server::config::{CommandConfig, CommandNotifierConfig, NotifierConfig, RootConfig, TaskConfig};
use notify_server::error::NotifyResult;
use notify_server::executor::registry::ProviderRegistry;
use notify_server::executor::seam::{ExecutorConfigSource, NotifierLookup, TaskExecutor};
use notify_server::executor::Executor;
use notify_server::ids::{CommandId, TaskId};
use notify_server::notifier::chat::test_double::InMemoryChatPlatform;
use notify_server::notifier::chat::{ChatPlatform, Update};
use notify_server::notifier::NotificationService;
use notify_server::provider::{ProviderCommandConfig, ProviderOutcome, TaskBase, TaskProvider};
use notify_server::snapshot::InMemorySnapshotStore;

const CHAT_ID: &str = "chat-1";

/// A provider that blocks on its cancellation token until told to stop
/// blocking, so the test can drive the `/cancel_<InstanceID>` round trip
/// deterministically instead of racing a real sleep.
struct GatedProvider {
    task_id: TaskId,
    commands: Vec<ProviderCommandConfig>,
    release: Arc<tokio::sync::Notify>,
    ran: Arc<AtomicBool>,
}

#[async_trait]
impl TaskProvider for GatedProvider {
    fn task_id(&self) -> &TaskId {
        &self.task_id
    }
    fn command_configs(&self) -> &[ProviderCommandConfig] {
        &self.commands
    }
    fn validate_settings(&self, _task_data: &serde_json::Value, _command_data: &serde_json::Value) -> NotifyResult<()> {
        Ok(())
    }
    async fn run(
        &self,
        base: &TaskBase,
        _task_data: &serde_json::Value,
        _command_data: &serde_json::Value,
        _prev_snapshot: Option<serde_json::Value>,
        _supports_html: bool,
    ) -> NotifyResult<ProviderOutcome> {
        tokio::select! {
            _ = self.release.notified() => {
                self.ran.store(true, Ordering::SeqCst);
                Ok(ProviderOutcome { message: "완료".into(), should_save: false, snapshot: None })
            }
            _ = base.cancel.cancelled() => Err(notify_server::error::NotifyError::Canceled),
        }
    }
}

fn demo_config() -> RootConfig {
    RootConfig {
        notifiers: vec![NotifierConfig {
            id: notify_server::ids::NotifierId::new("default"),
            bot_token: "t".into(),
            chat_id: CHAT_ID.into(),
        }],
        default_notifier_id: notify_server::ids::NotifierId::new("default"),
        tasks: vec![TaskConfig {
            id: TaskId::new("demo"),
            title: "Demo Task".into(),
            data: serde_json::Value::Null,
            commands: vec![CommandConfig {
                id: CommandId::new("run"),
                title: "Run it".into(),
                description: "runs the demo job".into(),
                notifier: CommandNotifierConfig {
                    usable: true,
                    default_notifier_id: None,
                },
                data: serde_json::Value::Null,
            }],
        }],
    }
}

struct Harness {
    service: Arc<NotificationService>,
    chat: Arc<InMemoryChatPlatform>,
    ran: Arc<AtomicBool>,
}

fn build_harness() -> Harness {
    let release = Arc::new(tokio::sync::Notify::new());
    let ran = Arc::new(AtomicBool::new(false));

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(GatedProvider {
        task_id: TaskId::new("demo"),
        commands: vec![ProviderCommandConfig::new(CommandId::new("run"), false, || serde_json::json!(null))],
        release,
        ran: Arc::clone(&ran),
    }));

    let config = demo_config();
    let shutdown = CancellationToken::new();
    let service = Arc::new(
        NotificationService::build(&config, &registry, shutdown.child_token())
            .expect("valid demo config builds a notification service"),
    );

    let store = Arc::new(InMemorySnapshotStore::new());
    let executor: Arc<dyn TaskExecutor> = Arc::new(Executor::new(
        registry,
        store,
        Arc::clone(&service) as Arc<dyn NotifierLookup>,
        Arc::new(config.clone()) as Arc<dyn ExecutorConfigSource>,
        shutdown.child_token(),
    ));

    let chat = Arc::new(InMemoryChatPlatform::new());
    let chat_for_spawn = Arc::clone(&chat);
    service.spawn_all(executor, move |_id| Arc::clone(&chat_for_spawn) as Arc<dyn ChatPlatform>);

    Harness { service, chat, ran }
}

fn send_inbound(chat: &InMemoryChatPlatform, text: &str) {
    chat.inbound_tx
        .send(Update { chat_id: CHAT_ID.into(), text: text.into() })
        .unwrap();
}

fn extract_cancel_id(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("/cancel_"))
        .map(|s| s.trim().to_string())
}

#[tokio::test]
async fn help_lists_the_registered_task_command() {
    let harness = build_harness();
    send_inbound(&harness.chat, "/help");

    let found = common::wait_until(200, || {
        futures::executor::block_on(harness.chat.sent_messages())
            .iter()
            .any(|(_, text, _)| text.contains("/demo_run"))
    })
    .await;
    assert!(found, "expected /help output to list the demo_run bot command");

    harness.service.shutdown().await;
}

#[tokio::test]
async fn unknown_text_gets_the_fallback_reply() {
    let harness = build_harness();
    send_inbound(&harness.chat, "hello there");

    let found = common::wait_until(200, || {
        futures::executor::block_on(harness.chat.sent_messages())
            .iter()
            .any(|(_, text, _)| text.contains("알 수 없는 명령"))
    })
    .await;
    assert!(found);

    harness.service.shutdown().await;
}

#[tokio::test]
async fn updates_from_a_foreign_chat_id_are_dropped() {
    let harness = build_harness();
    harness
        .chat
        .inbound_tx
        .send(Update { chat_id: "some-other-chat".into(), text: "/help".into() })
        .unwrap();

    // Give the worker a few ticks to (not) process the foreign update, then
    // confirm nothing was sent and the demo task never ran.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.chat.sent_messages().await.is_empty());
    assert!(!harness.ran.load(Ordering::SeqCst));

    harness.service.shutdown().await;
}

#[tokio::test]
async fn submitting_then_canceling_suppresses_the_error_notification() {
    let harness = build_harness();
    send_inbound(&harness.chat, "/demo_run");

    // The started notification carries the cancel deep-link.
    let started = common::wait_until(200, || {
        futures::executor::block_on(harness.chat.sent_messages())
            .iter()
            .any(|(_, text, _)| text.contains("/cancel_"))
    })
    .await;
    assert!(started, "expected a started notification with a cancel deep-link");

    let cancel_id = {
        let sent = harness.chat.sent_messages().await;
        sent.iter()
            .find_map(|(_, text, _)| extract_cancel_id(text))
            .expect("a /cancel_<id> line was sent")
    };

    send_inbound(&harness.chat, &format!("/cancel_{cancel_id}"));

    // The gated provider never receives `release.notify()`, so the only way
    // its run terminates is via cancellation; wait for the "ran" flag to
    // stay false for a while and for no error-framed message to show up.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!harness.ran.load(Ordering::SeqCst));
    let sent = harness.chat.sent_messages().await;
    assert!(
        sent.iter().all(|(_, text, _)| !text.contains("오류")),
        "user-initiated cancellation must not surface an error notification"
    );

    harness.service.shutdown().await;
}
