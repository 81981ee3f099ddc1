//! Chat platform seam: the wire protocol to the concrete chat SDK
//! (Telegram-shaped in the reference deployment) is an external
//! collaborator. This crate only depends on a narrow trait: send one
//! message, and block for the next inbound update.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::NotifyResult;

/// Maximum single-message size the reference chat platform accepts.
pub const PLATFORM_MESSAGE_CAP: usize = 4096;

/// One inbound update from the chat platform.
#[derive(Debug, Clone)]
pub struct Update {
    pub chat_id: String,
    pub text: String,
}

/// The chat-platform wire protocol, as seen by a `NotifierHandler`.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Send one message to `chat_id`. `html` selects the platform's HTML
    /// parse mode.
    async fn send(&self, chat_id: &str, text: &str, html: bool) -> NotifyResult<()>;

    /// Block until the next inbound update arrives, or `cancel` fires.
    /// Returns `Ok(None)` when the platform's update stream has ended.
    async fn next_update(&self, cancel: &CancellationToken) -> NotifyResult<Option<Update>>;
}

pub mod test_double {
    //! In-memory `ChatPlatform` reference implementation, always compiled so
    //! both unit tests and integration tests (a separate compilation unit)
    //! can depend on it.
    use super::*;
    use tokio::sync::{mpsc, Mutex};

    /// In-memory `ChatPlatform` for tests: sent messages are recorded,
    /// inbound updates are injected via `inbound`.
    pub struct InMemoryChatPlatform {
        pub sent: Mutex<Vec<(String, String, bool)>>,
        inbound: Mutex<mpsc::UnboundedReceiver<Update>>,
        pub inbound_tx: mpsc::UnboundedSender<Update>,
    }

    impl InMemoryChatPlatform {
        pub fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                sent: Mutex::new(Vec::new()),
                inbound: Mutex::new(rx),
                inbound_tx: tx,
            }
        }

        pub async fn sent_messages(&self) -> Vec<(String, String, bool)> {
            self.sent.lock().await.clone()
        }
    }

    impl Default for InMemoryChatPlatform {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ChatPlatform for InMemoryChatPlatform {
        async fn send(&self, chat_id: &str, text: &str, html: bool) -> NotifyResult<()> {
            self.sent
                .lock()
                .await
                .push((chat_id.to_string(), text.to_string(), html));
            Ok(())
        }

        async fn next_update(&self, cancel: &CancellationToken) -> NotifyResult<Option<Update>> {
            let mut rx = self.inbound.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Ok(None),
                update = rx.recv() => Ok(update),
            }
        }
    }

}
