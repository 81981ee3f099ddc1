//! Long-running notification and task-orchestration daemon library.
//!
//! Operators register *tasks* (external data-collection/processing jobs
//! with one or more *commands*), driven on a schedule and on demand via
//! chat-based *notifier* channels, producing formatted notifications about
//! state changes. See `executor`, `notifier`, and `provider` for the three
//! major subsystems.

pub mod config;
pub mod decode;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod ids;
pub mod notifier;
pub mod provider;
pub mod snapshot;
pub mod strings;

pub use error::{ErrorKind, NotifyError, NotifyResult};
