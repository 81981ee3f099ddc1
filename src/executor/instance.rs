//! The executor's live-instance table.
//!
//! Two views are kept in step: `by_key` enforces at-most-one-live-instance
//! per `(TaskId, CommandId)` when a provider's command disallows
//! `AllowMultiple`; `by_instance` is what `CancelTask` looks up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{NotifyError, NotifyResult};
use crate::ids::{InstanceId, TaskCommandKey};

/// Cancellation handle for one live run. `user_canceled` disambiguates
/// "a user asked to stop" from any other path that cancels the token (e.g.
/// process shutdown), per the executor's suppress-error-notification rule.
pub struct LiveInstance {
    pub cancel: CancellationToken,
    pub user_canceled: Arc<AtomicBool>,
}

#[derive(Default)]
pub struct LiveSet {
    by_key: Mutex<HashMap<TaskCommandKey, InstanceId>>,
    by_instance: Mutex<HashMap<InstanceId, LiveInstance>>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly-admitted instance. Rejects with `AlreadyRunning` if
    /// `allow_multiple` is false and the key is already live.
    pub async fn admit(
        &self,
        key: &TaskCommandKey,
        allow_multiple: bool,
        instance_id: InstanceId,
        cancel: CancellationToken,
        user_canceled: Arc<AtomicBool>,
    ) -> NotifyResult<()> {
        if !allow_multiple {
            let mut by_key = self.by_key.lock().await;
            if by_key.contains_key(key) {
                return Err(NotifyError::AlreadyRunning(key.to_string()));
            }
            by_key.insert(key.clone(), instance_id.clone());
        }
        self.by_instance
            .lock()
            .await
            .insert(instance_id, LiveInstance { cancel, user_canceled });
        Ok(())
    }

    /// Unregister a completed/failed/cancelled instance. Step 9 of the
    /// submission algorithm.
    pub async fn release(&self, key: &TaskCommandKey, instance_id: &InstanceId, allow_multiple: bool) {
        if !allow_multiple {
            let mut by_key = self.by_key.lock().await;
            if by_key.get(key) == Some(instance_id) {
                by_key.remove(key);
            }
        }
        self.by_instance.lock().await.remove(instance_id);
    }

    /// Signal cancellation for a live instance. Unknown IDs return
    /// `InstanceUnknown`; repeated calls on the same (already cancelled)
    /// instance are harmless since `CancellationToken::cancel` is itself
    /// idempotent.
    pub async fn cancel(&self, instance_id: &InstanceId) -> NotifyResult<()> {
        let by_instance = self.by_instance.lock().await;
        match by_instance.get(instance_id) {
            Some(live) => {
                live.user_canceled.store(true, Ordering::SeqCst);
                live.cancel.cancel();
                Ok(())
            }
            None => Err(NotifyError::InstanceUnknown(instance_id.to_string())),
        }
    }

    #[cfg(test)]
    pub async fn live_count(&self) -> usize {
        self.by_instance.lock().await.len()
    }
}
