//! Task Executor: the 9-step submission algorithm — admit, run,
//! persist, notify.

pub mod instance;
pub mod registry;
pub mod seam;
pub mod types;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::{NotifyError, NotifyResult};
use crate::ids::{InstanceId, NotifierId, TaskCommandKey};
use crate::snapshot::SnapshotStore;

use self::instance::LiveSet;
use self::registry::ProviderRegistry;
use self::seam::{ExecutorConfigSource, NotifierLookup, TaskExecutor};
use self::types::{TaskContext, TaskSubmitRequest};

/// Upper bound on a single provider run. Orthogonal to the cancellation
/// token a user-initiated `CancelTask` drives: this fires even when nobody
/// asked for the run to stop, and — unlike `Canceled` — is always reported
/// as an error notification.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Accepts submissions, enforces per-`(TaskId, CommandId)` admission, runs
/// the registered provider, persists its snapshot, and emits notifications
/// through the `NotifierLookup` seam.
pub struct Executor {
    registry: ProviderRegistry,
    store: Arc<dyn SnapshotStore>,
    notifiers: Arc<dyn NotifierLookup>,
    config_source: Arc<dyn ExecutorConfigSource>,
    live: LiveSet,
    run_timeout: Duration,
    root_cancel: CancellationToken,
}

impl Executor {
    pub fn new(
        registry: ProviderRegistry,
        store: Arc<dyn SnapshotStore>,
        notifiers: Arc<dyn NotifierLookup>,
        config_source: Arc<dyn ExecutorConfigSource>,
        root_cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            store,
            notifiers,
            config_source,
            live: LiveSet::new(),
            run_timeout: DEFAULT_RUN_TIMEOUT,
            root_cancel,
        }
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    #[instrument(skip_all, fields(task_id = %req.task_id, command_id = %req.command_id))]
    async fn submit(&self, req: TaskSubmitRequest) -> NotifyResult<InstanceId> {
        // Step 1: resolve the provider.
        let provider = self
            .registry
            .get(&req.task_id)
            .ok_or_else(|| NotifyError::TaskNotSupported(req.task_id.to_string()))?
            .clone();

        let command_config = provider
            .command_config(&req.command_id)
            .ok_or_else(|| NotifyError::CommandNotSupported(req.command_id.to_string()))?
            .clone();

        let notifier = self
            .notifiers
            .get(&req.notifier_id)
            .ok_or_else(|| NotifyError::NotifierNotFound(req.notifier_id.to_string()))?;

        // Step 2: decode/validate settings, resolved from `config_source`
        // keyed by `(task_id, command_id)`.
        let (task_data, command_data) = self.config_data(&req);
        provider.validate_settings(&task_data, &command_data)?;

        // Step 3: allocate identity and cancellation.
        let instance_id = InstanceId::generate();
        let key = TaskCommandKey::new(req.task_id.clone(), req.command_id.clone());
        let cancel = self.root_cancel.child_token();
        let user_canceled = Arc::new(AtomicBool::new(false));
        let allow_multiple = command_config.allow_multiple;

        // Step 4: admission.
        self.live
            .admit(&key, allow_multiple, instance_id.clone(), cancel.clone(), user_canceled.clone())
            .await?;

        // Step 5: started notification.
        if req.notify_on_start && req.run_by == crate::ids::RunBy::User {
            let ctx = TaskContext::started(req.task_id.clone(), req.command_id.clone(), instance_id.clone());
            notifier.notify(&ctx, "작업을 시작합니다...");
        }

        let supports_html = notifier.supports_html();
        let start = Instant::now();

        // Steps 6-8.
        let outcome = run_submission(
            provider,
            key.clone(),
            instance_id.clone(),
            req.run_by,
            task_data,
            command_data,
            cancel.clone(),
            user_canceled.clone(),
            supports_html,
            self.run_timeout,
            &*self.store,
        )
        .await;

        let elapsed = start.elapsed();
        self.finish(&*notifier, &req, &instance_id, &key, allow_multiple, elapsed, outcome, &user_canceled)
            .await;

        Ok(instance_id)
    }

    /// Resolve the provider's own `Data` blobs via `config_source`, keyed by
    /// `(task_id, command_id)`. Unknown keys resolve to `Value::Null` rather
    /// than an error here — `validate_settings` is what decides whether an
    /// empty blob is acceptable for a given provider.
    fn config_data(&self, req: &TaskSubmitRequest) -> (serde_json::Value, serde_json::Value) {
        let task_data = self.config_source.task_data(&req.task_id);
        let command_data = self.config_source.command_data(&req.task_id, &req.command_id);
        (task_data, command_data)
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        notifier: &dyn self::seam::Notifier,
        req: &TaskSubmitRequest,
        instance_id: &InstanceId,
        key: &TaskCommandKey,
        allow_multiple: bool,
        elapsed: Duration,
        outcome: NotifyResult<ProviderRunOutcome>,
        user_canceled: &AtomicBool,
    ) {
        match outcome {
            Err(NotifyError::Canceled) => {
                if user_canceled.load(std::sync::atomic::Ordering::SeqCst) {
                    info!(instance_id = %instance_id, "run canceled by user, suppressing error notification");
                } else {
                    // Cancellation that didn't originate from an explicit
                    // `/cancel_*`/`CancelTask` call (e.g. a shutdown cascade)
                    // is not the "quiet, intentional stop" case — it is
                    // reported the same way `DeadlineExceeded` is, per the
                    // `user_canceled` flag design (see DESIGN.md).
                    warn!(instance_id = %instance_id, "run canceled without explicit user request");
                    let ctx = TaskContext::finished(req.task_id.clone(), req.command_id.clone(), instance_id.clone(), elapsed, true);
                    notifier.notify(&ctx, "실행이 취소되었습니다 (사용자 요청에 의한 취소가 아닙니다).");
                }
            }
            Err(err) => {
                error!(instance_id = %instance_id, error = %err, "provider run failed");
                let ctx = TaskContext::finished(req.task_id.clone(), req.command_id.clone(), instance_id.clone(), elapsed, true);
                notifier.notify(&ctx, &format!("실행 중 오류가 발생했습니다: {err}"));
            }
            Ok(run_outcome) => {
                if !run_outcome.message.is_empty() {
                    let ctx = TaskContext::finished(req.task_id.clone(), req.command_id.clone(), instance_id.clone(), elapsed, false);
                    notifier.notify(&ctx, &run_outcome.message);
                }
            }
        }

        // Step 9.
        self.live.release(key, instance_id, allow_multiple).await;
    }
}

struct ProviderRunOutcome {
    message: String,
}

/// Steps 6-8: load the previous snapshot, invoke the provider (racing it
/// against `run_timeout` and catching panics), and persist the result.
#[allow(clippy::too_many_arguments)]
async fn run_submission(
    provider: Arc<dyn crate::provider::TaskProvider>,
    key: TaskCommandKey,
    instance_id: InstanceId,
    run_by: crate::ids::RunBy,
    task_data: serde_json::Value,
    command_data: serde_json::Value,
    cancel: CancellationToken,
    user_canceled: Arc<AtomicBool>,
    supports_html: bool,
    run_timeout: Duration,
    store: &dyn SnapshotStore,
) -> NotifyResult<ProviderRunOutcome> {
    // Step 6.
    let prev_snapshot = store.load(&key).await?;

    let base = crate::provider::TaskBase {
        task_id: key.task_id.clone(),
        command_id: key.command_id.clone(),
        instance_id: instance_id.clone(),
        run_by,
        cancel: cancel.clone(),
    };

    // Step 7, racing the deadline. `Canceled` (user-driven) and
    // `DeadlineExceeded` (this timeout) are deliberately distinct error
    // variants so step 8's suppression rule can tell them apart.
    let run_future = AssertUnwindSafe(provider.run(&base, &task_data, &command_data, prev_snapshot, supports_html))
        .catch_unwind();

    let result = tokio::select! {
        biased;
        _ = tokio::time::sleep(run_timeout) => {
            cancel.cancel();
            return Err(NotifyError::DeadlineExceeded);
        }
        outcome = run_future => outcome,
    };

    let outcome = match result {
        Ok(inner) => inner,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            return Err(NotifyError::Internal(format!("provider panicked: {message}")));
        }
    };

    if user_canceled.load(std::sync::atomic::Ordering::SeqCst) {
        if let Err(e) = &outcome {
            if e.is_canceled() {
                return Err(NotifyError::Canceled);
            }
        }
    }

    let outcome = outcome?;

    // Step 8's consistency trap: a provider claiming `should_save` without
    // offering a snapshot (or vice versa in spirit) is a provider bug, not
    // grounds to silently persist garbage.
    if outcome.should_save {
        match outcome.snapshot {
            Some(snapshot) => store.save(&key, snapshot).await?,
            None => {
                warn!(task_id = %key.task_id, command_id = %key.command_id, "provider set should_save without a snapshot; not persisting");
            }
        }
    }

    Ok(ProviderRunOutcome { message: outcome.message })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[async_trait::async_trait]
impl TaskExecutor for Executor {
    async fn submit_task(&self, req: TaskSubmitRequest) -> NotifyResult<InstanceId> {
        self.submit(req).await
    }

    async fn cancel_task(&self, instance_id: &InstanceId) -> NotifyResult<()> {
        self.live.cancel(instance_id).await
    }
}
