//! Alerts pushed to a fixed webhook endpoint as a JSON POST.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;

use super::{AlertDispatcher, DispatchError};

pub struct WebhookSender {
    client: Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl AlertDispatcher for WebhookSender {
    async fn send(&self, destination: &str, message: &str) -> Result<(), DispatchError> {
        let body = json!({
            "destination": destination,
            "message": message,
        });

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(DispatchError::SendFailed(format!(
                "Webhook returned non-success status: {status}. Body: {error_body}"
            )));
        }
        Ok(())
    }
}
