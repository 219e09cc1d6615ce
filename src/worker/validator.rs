//! Sanity-checks raw check data before it is allowed anywhere near a probe.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CheckRecord, CheckState, HttpMethod, Protocol};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("missing or invalid field `{0}`")]
    InvalidField(&'static str),
}

/// Maps a raw stored value to a normalized [`CheckRecord`].
///
/// Required fields must satisfy their type and range constraints or the whole
/// record is rejected. Optional fields fall back to their defaults: `state`
/// to `down`, `lastChecked` to unset.
pub fn validate(raw: &Value) -> Result<CheckRecord, ValidationError> {
    if !raw.is_object() {
        return Err(ValidationError::NotAnObject);
    }

    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| id.len() == 20)
        .ok_or(ValidationError::InvalidField("id"))?
        .to_string();

    let user_ref = raw
        .get("userRef")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|user| user.len() == 10 && user.chars().all(|c| c.is_ascii_digit()))
        .ok_or(ValidationError::InvalidField("userRef"))?
        .to_string();

    let protocol = match raw.get("protocol").and_then(Value::as_str) {
        Some("http") => Protocol::Http,
        Some("https") => Protocol::Https,
        _ => return Err(ValidationError::InvalidField("protocol")),
    };

    let url = raw
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(ValidationError::InvalidField("url"))?
        .to_string();

    let method = match raw.get("method").and_then(Value::as_str) {
        Some("get") => HttpMethod::Get,
        Some("post") => HttpMethod::Post,
        Some("put") => HttpMethod::Put,
        Some("delete") => HttpMethod::Delete,
        _ => return Err(ValidationError::InvalidField("method")),
    };

    let raw_codes = raw
        .get("successCodes")
        .and_then(Value::as_array)
        .ok_or(ValidationError::InvalidField("successCodes"))?;
    let mut success_codes = BTreeSet::new();
    for code in raw_codes {
        let code = code
            .as_u64()
            .and_then(|c| u16::try_from(c).ok())
            .ok_or(ValidationError::InvalidField("successCodes"))?;
        success_codes.insert(code);
    }
    if success_codes.is_empty() {
        return Err(ValidationError::InvalidField("successCodes"));
    }

    let timeout_seconds = raw
        .get("timeoutSeconds")
        .and_then(Value::as_u64)
        .filter(|t| (1..=5).contains(t))
        .ok_or(ValidationError::InvalidField("timeoutSeconds"))? as u8;

    // Keys the worker itself maintains; missing or malformed values mean the
    // check has never been seen before.
    let state = match raw.get("state").and_then(Value::as_str) {
        Some("up") => CheckState::Up,
        _ => CheckState::Down,
    };
    let last_checked = raw
        .get("lastChecked")
        .and_then(Value::as_i64)
        .filter(|ms| *ms > 0)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

    Ok(CheckRecord {
        id,
        user_ref,
        protocol,
        url,
        method,
        success_codes,
        timeout_seconds,
        state,
        last_checked,
    })
}
