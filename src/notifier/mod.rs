//! Notifier Handler subsystem: chat-channel I/O, message formatting,
//! and bot command dispatch.

pub mod chat;
pub mod chunk;
pub mod commands;
pub mod format;
pub mod handler;
pub mod service;

pub use chat::{ChatPlatform, Update};
pub use handler::{NotifierHandler, NotifierHandlerConfig};
pub use service::NotificationService;
