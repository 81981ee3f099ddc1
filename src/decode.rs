//! Narrow map→struct settings decoder.
//!
//! The full weakly-typed "decode any map into any struct, with embedded
//! struct squashing and `ErrorUnused`" utility is an external collaborator.
//! What providers actually need is much smaller: each task and each command
//! declares a `serde::Deserialize` settings struct, and the `Data` field of
//! its config entry (an untyped `serde_json::Value`) decodes into it. This
//! module provides exactly that, plus two string-hooks: CSV-to-`Vec` and a
//! type-strict milliseconds-to-`Duration` hook.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{NotifyError, NotifyResult};

/// Decode `data` into `T`, reporting failures as `NotifyError::InvalidSettings`.
pub fn from_value<T: DeserializeOwned>(data: &serde_json::Value) -> NotifyResult<T> {
    serde_json::from_value(data.clone())
        .map_err(|e| NotifyError::InvalidSettings(format!("settings decode failed: {e}")))
}

/// `serde(deserialize_with = "csv")` hook: splits a comma-separated string
/// into a trimmed, non-empty `Vec<String>`. An absent or empty field decodes
/// to an empty vec rather than failing.
pub fn csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(split_csv(&raw))
}

/// Same as [`csv`] but for `Option<String>` fields — absent stays absent.
pub fn csv_opt<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|s| split_csv(&s)))
}

/// Split and clean a CSV string the same way regardless of call site: split
/// on `,`, trim whitespace, drop empty segments.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `serde(deserialize_with = "millis")` hook: a plain JSON integer field,
/// interpreted as milliseconds, decoded into a `Duration`.
///
/// Type-strict: a JSON string (even `"100"`) is rejected rather than
/// silently coerced — a loose hook would let a plain integer field be
/// hijacked by an incompatible alias; this hook only ever accepts a number.
pub fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = i64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}
