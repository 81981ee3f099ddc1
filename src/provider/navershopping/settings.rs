//! Task- and command-level settings for the price-watch provider, decoded
//! from the config surface's untyped `Data` blobs via [`crate::decode`].

use std::time::Duration;

use serde::Deserialize;

use crate::decode;
use crate::error::{NotifyError, NotifyResult};

/// Task-level settings: API credentials shared by every command under this
/// task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSettings {
    pub client_id: String,
    pub client_secret: String,
}

impl TaskSettings {
    pub fn decode_and_validate(data: &serde_json::Value) -> NotifyResult<Self> {
        let settings: TaskSettings = decode::from_value(data)?;
        if settings.client_id.trim().is_empty() {
            return Err(NotifyError::InvalidSettings("client_id must not be empty".into()));
        }
        if settings.client_secret.trim().is_empty() {
            return Err(NotifyError::InvalidSettings(
                "client_secret must not be empty".into(),
            ));
        }
        Ok(TaskSettings {
            client_id: settings.client_id.trim().to_string(),
            client_secret: settings.client_secret.trim().to_string(),
        })
    }
}

/// Command-level settings: the search query and its filters.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSettings {
    pub query: String,
    #[serde(default)]
    pub filters: Filters,
    #[serde(deserialize_with = "decode::millis", default = "default_page_fetch_delay")]
    pub page_fetch_delay: Duration,
}

fn default_page_fetch_delay() -> Duration {
    Duration::from_millis(100)
}

impl CommandSettings {
    pub fn decode_and_validate(data: &serde_json::Value) -> NotifyResult<Self> {
        let mut settings: CommandSettings = decode::from_value(data)?;
        let trimmed = settings.query.trim().to_string();
        if trimmed.is_empty() {
            return Err(NotifyError::InvalidSettings("query must not be empty".into()));
        }
        settings.query = trimmed;
        if settings.filters.price_less_than <= 0 {
            return Err(NotifyError::InvalidSettings(
                "filters.price_less_than must be strictly positive".into(),
            ));
        }
        if settings.page_fetch_delay.is_zero() {
            settings.page_fetch_delay = default_page_fetch_delay();
        }
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    #[serde(deserialize_with = "decode::csv", default)]
    pub included_keywords: Vec<String>,
    #[serde(deserialize_with = "decode::csv", default)]
    pub excluded_keywords: Vec<String>,
    pub price_less_than: i64,
}
