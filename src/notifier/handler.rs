//! Notifier Handler: one cooperative worker per chat channel,
//! bridging the Executor to a single `ChatPlatform` channel in both
//! directions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::NotifyResult;
use crate::executor::seam::{Notifier as NotifierSeam, TaskExecutor};
use crate::executor::types::{TaskContext, TaskSubmitRequest};
use crate::ids::{CommandId, NotifierId, RunBy, TaskId};

use super::chat::ChatPlatform;
use super::chunk::{chunk, CHUNK_CAP};
use super::commands::{self, BotCommand, ParsedCommand};
use super::format;

/// Default outbound queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

struct OutboundRequest {
    ctx: TaskContext,
    message: String,
}

/// Configuration for one notifier channel.
pub struct NotifierHandlerConfig {
    pub id: NotifierId,
    pub chat_id: String,
    pub supports_html: bool,
    pub queue_capacity: usize,
    pub commands: Vec<BotCommand>,
}

/// One chat-channel endpoint: owns the outbound queue's sending half (for
/// [`NotifierSeam::notify`]) and — once [`NotifierHandler::run`] is spawned
/// — its receiving half and the inbound polling loop.
pub struct NotifierHandler {
    id: NotifierId,
    chat_id: String,
    supports_html: bool,
    outbound_tx: Mutex<Option<mpsc::Sender<OutboundRequest>>>,
    outbound_rx: Mutex<Option<mpsc::Receiver<OutboundRequest>>>,
    commands: HashMap<String, BotCommand>,
}

impl NotifierHandler {
    /// Build a handler. Its outbound receiver is owned internally and taken
    /// by the first call to [`NotifierHandler::run`].
    /// Returns `Err(DuplicateCommand)` if two of `config.commands` derive
    /// the same bot-command name.
    pub fn build(config: NotifierHandlerConfig) -> NotifyResult<Arc<Self>> {
        let commands = commands::build_registry(config.commands)?;
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        Ok(Arc::new(Self {
            id: config.id,
            chat_id: config.chat_id,
            supports_html: config.supports_html,
            outbound_tx: Mutex::new(Some(tx)),
            outbound_rx: Mutex::new(Some(rx)),
            commands,
        }))
    }

    pub fn id(&self) -> &NotifierId {
        &self.id
    }

    pub fn supports_html(&self) -> bool {
        self.supports_html
    }

    /// Every registered bot command, for `/help` rendering.
    pub fn bot_commands(&self) -> Vec<&BotCommand> {
        self.commands.values().collect()
    }

    /// Non-blocking enqueue. `false` means the queue is full or the worker
    /// has already stopped (its receiver dropped).
    pub fn notify(&self, ctx: &TaskContext, message: &str) -> bool {
        let Ok(guard) = self.outbound_tx.try_lock() else {
            // Another notify is mid-send on a bounded channel that's
            // momentarily locked; treat as backpressure, not failure.
            return false;
        };
        match guard.as_ref() {
            Some(tx) => tx
                .try_send(OutboundRequest {
                    ctx: ctx.clone(),
                    message: message.to_string(),
                })
                .is_ok(),
            None => false,
        }
    }

    /// Idempotent shutdown: drop the sending half so any future `notify`
    /// call observes a closed channel.
    pub async fn close(&self) {
        self.outbound_tx.lock().await.take();
    }

    /// Run the worker loop until `cancel` fires: poll inbound updates,
    /// drain the outbound queue, dispatch commands to `executor`. Panics if
    /// called more than once on the same handler — there is only one
    /// outbound receiver to take.
    #[instrument(skip_all, fields(notifier_id = %self.id))]
    pub async fn run(
        self: Arc<Self>,
        chat: Arc<dyn ChatPlatform>,
        executor: Arc<dyn TaskExecutor>,
        cancel: CancellationToken,
    ) {
        let mut outbound_rx = self
            .outbound_rx
            .lock()
            .await
            .take()
            .expect("NotifierHandler::run called more than once");
        info!("notifier worker starting");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("notifier worker shutting down");
                    break;
                }
                update = chat.next_update(&cancel) => {
                    match update {
                        Ok(Some(update)) => {
                            if update.chat_id != self.chat_id {
                                debug!(chat_id = %update.chat_id, "dropping update from foreign chat");
                                continue;
                            }
                            self.handle_inbound(&*chat, &*executor, &update.text).await;
                        }
                        Ok(None) => {
                            debug!("chat platform update stream ended");
                        }
                        Err(e) => {
                            warn!(error = %e, "failed polling chat platform for updates");
                        }
                    }
                }
                req = outbound_rx.recv() => {
                    match req {
                        Some(req) => self.handle_outbound(&*chat, req).await,
                        None => {
                            debug!("outbound queue closed");
                        }
                    }
                }
            }
        }
        self.close().await;
    }

    async fn handle_outbound(&self, chat: &dyn ChatPlatform, req: OutboundRequest) {
        let title_lookup = || {
            let task_id = req.ctx.task_id.as_ref()?;
            let command_id = req.ctx.command_id.as_ref()?;
            let name = commands::derive_name(task_id, command_id);
            self.commands.get(&name).map(|c| c.title.clone())
        };
        let rendered = format::enrich(&req.ctx, &req.message, title_lookup);

        for piece in chunk(&rendered, CHUNK_CAP) {
            if let Err(e) = chat.send(&self.chat_id, &piece, self.supports_html).await {
                error!(error = %e, "failed sending outbound message");
            }
        }
    }

    async fn handle_inbound(&self, chat: &dyn ChatPlatform, executor: &dyn TaskExecutor, text: &str) {
        if !text.starts_with('/') {
            let _ = chat
                .send(&self.chat_id, "알 수 없는 명령입니다 — `/help`를 입력해 보세요.", self.supports_html)
                .await;
            return;
        }

        match commands::parse(text, &self.commands) {
            ParsedCommand::Help => {
                let body = self.render_help();
                let _ = chat.send(&self.chat_id, &body, self.supports_html).await;
            }
            ParsedCommand::InvalidCancel => {
                let _ = chat
                    .send(&self.chat_id, "잘못된 취소 형식입니다.", self.supports_html)
                    .await;
            }
            ParsedCommand::Cancel(instance_id) => {
                if let Err(e) = executor.cancel_task(&instance_id).await {
                    let _ = chat
                        .send(&self.chat_id, &format!("취소 실패: {e}"), self.supports_html)
                        .await;
                }
            }
            ParsedCommand::Task(name) => {
                let Some(cmd) = self.commands.get(&name) else {
                    return;
                };
                let req = submit_request(self.id.clone(), cmd.task_id.clone(), cmd.command_id.clone());
                if let Err(e) = executor.submit_task(req).await {
                    let _ = chat
                        .send(&self.chat_id, &format!("실행 실패: {e}"), self.supports_html)
                        .await;
                }
            }
            ParsedCommand::Unknown => {
                let _ = chat
                    .send(&self.chat_id, "알 수 없는 명령입니다 — `/help`를 입력해 보세요.", self.supports_html)
                    .await;
            }
        }
    }

    fn render_help(&self) -> String {
        let mut lines = vec!["사용 가능한 명령어:".to_string(), "/help — 이 메시지".to_string()];
        let mut commands: Vec<&BotCommand> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        for cmd in commands {
            lines.push(format!("/{} — {} ({})", cmd.name, cmd.title, cmd.description));
        }
        lines.join("\n")
    }
}

fn submit_request(notifier_id: NotifierId, task_id: TaskId, command_id: CommandId) -> TaskSubmitRequest {
    TaskSubmitRequest {
        task_id,
        command_id,
        notifier_id,
        run_by: RunBy::User,
        notify_on_start: true,
    }
}

impl NotifierSeam for NotifierHandler {
    fn notify(&self, ctx: &TaskContext, message: &str) -> bool {
        NotifierHandler::notify(self, ctx, message)
    }

    fn supports_html(&self) -> bool {
        NotifierHandler::supports_html(self)
    }
}
