//! HTTP fetch seam.
//!
//! Providers never hold a `reqwest::Client` directly — they depend on
//! `Fetcher`, so a test double can replace the network without touching
//! provider code. The trait returns `serde_json::Value` rather than a
//! generic type parameter so it stays object-safe: providers are stored
//! behind `Arc<dyn TaskProvider>`, and a generic trait method would forbid
//! that. Callers decode the returned value into their own response shape.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{NotifyError, NotifyResult};

/// Fetches and decodes JSON from an HTTP endpoint, honoring cancellation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `GET url` with the given headers and query parameters, returning the
    /// decoded JSON body. Returns `NotifyError::Canceled` if `cancel` fires
    /// before the request completes.
    async fn fetch_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> NotifyResult<serde_json::Value>;
}

/// Production [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> NotifyResult<serde_json::Value> {
        let mut req = self.client.get(url).query(query);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(NotifyError::Canceled),
            result = req.send() => result?,
        };

        let response = response.error_for_status()?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NotifyError::Canceled),
            result = response.json::<serde_json::Value>() => Ok(result?),
        }
    }
}

/// Decode a fetched JSON `Value` into a caller-supplied shape, mapping a
/// decode failure to `NotifyError::Fetch` — the response came from the
/// network, not from caller input, so a parse failure here is a transport
/// problem rather than an `InvalidInput` one.
pub fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> NotifyResult<T> {
    serde_json::from_value(value).map_err(|e| NotifyError::Fetch(format!("decode failed: {e}")))
}
