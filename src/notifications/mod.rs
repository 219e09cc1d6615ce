//! Alert delivery to check owners.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::CheckRecord;

pub mod twilio;
pub mod webhook;

pub use twilio::TwilioSender;
pub use webhook::WebhookSender;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Failed to deliver alert: {0}")]
    SendFailed(String),
    #[error("Invalid dispatcher configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Delivers one alert message to one destination. Concrete senders decide
/// what a destination means (a phone number for SMS, ignored for a fixed
/// webhook endpoint).
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn send(&self, destination: &str, message: &str) -> Result<(), DispatchError>;
}

/// The message sent when a check changes state.
pub fn alert_message(check: &CheckRecord) -> String {
    format!(
        "Alert: Your check for {} {}://{} is currently {}",
        check.method, check.protocol, check.url, check.state
    )
}
