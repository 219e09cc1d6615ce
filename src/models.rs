//! Domain types for monitored checks and probe results.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport scheme a check is probed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// HTTP method used for the probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Last-known reachability classification of a check.
///
/// Records written before the worker ever probed them carry no `state` field;
/// deserialization and validation both fall back to `Down` (the legacy
/// default). "Never probed" is expressed by `last_checked` being unset, which
/// is also what suppresses the first alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Up,
    #[default]
    Down,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Up => write!(f, "up"),
            CheckState::Down => write!(f, "down"),
        }
    }
}

/// A monitored endpoint definition, persisted in the `checks` collection.
///
/// Only `state` and `last_checked` are ever mutated by the worker; everything
/// else is owned by the CRUD layer that created the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRecord {
    /// 20-character opaque id, unique within the collection.
    pub id: String,
    /// Owner identifier, a 10-digit string. Doubles as the alert destination.
    pub user_ref: String,
    pub protocol: Protocol,
    /// Host and path, without the scheme (e.g. `example.com/health`).
    pub url: String,
    pub method: HttpMethod,
    /// Status codes that count as "up". Never empty for a validated record.
    pub success_codes: BTreeSet<u16>,
    /// Total probe timeout in seconds, in [1, 5].
    pub timeout_seconds: u8,
    #[serde(default)]
    pub state: CheckState,
    /// Millisecond timestamp of the last completed probe; `None` means the
    /// worker has never evaluated this check.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_checked: Option<DateTime<Utc>>,
}

impl CheckRecord {
    /// Full target URL the probe request is sent to.
    pub fn target_url(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }
}

/// Why a probe attempt failed to produce a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The timeout fired before any response arrived.
    Timeout,
    /// Connection, DNS, or protocol failure below the HTTP layer.
    Transport(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::Transport(cause) => write!(f, "{cause}"),
        }
    }
}

/// Terminal result of a single probe attempt.
///
/// Exactly one of the three terminal events (response, transport error,
/// timeout) produces this value; the variants make the mutual exclusion
/// structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A response was received, whatever its status.
    Response(u16),
    Failed(ProbeFailure),
}

impl CheckOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, CheckOutcome::Failed(_))
    }

    pub fn response_code(&self) -> Option<u16> {
        match self {
            CheckOutcome::Response(code) => Some(*code),
            CheckOutcome::Failed(_) => None,
        }
    }
}
