//! Outbound probe execution with a single-fire outcome guard.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, Method};

use crate::models::{CheckOutcome, CheckRecord, HttpMethod, ProbeFailure};

/// One-shot slot for a probe's terminal event.
///
/// The response, the transport error, and the timeout timer race each other;
/// whichever arrives first wins the slot and every later completion attempt
/// is discarded. All event sources for one probe attempt must share one slot.
#[derive(Default)]
pub struct OutcomeSlot {
    cell: OnceLock<CheckOutcome>,
}

impl OutcomeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terminal event if none has been recorded yet. Returns
    /// whether this call won the race.
    pub fn complete(&self, outcome: CheckOutcome) -> bool {
        self.cell.set(outcome).is_ok()
    }

    pub fn into_outcome(self) -> Option<CheckOutcome> {
        self.cell.into_inner()
    }
}

/// Issues a single probe attempt for a validated check.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, check: &CheckRecord) -> CheckOutcome;
}

pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new() -> Result<Self, reqwest::Error> {
        // The outcome is the status of the first response; redirects are not
        // followed, so a 301 from an endpoint whose success set contains 301
        // counts as up.
        Ok(Self {
            client: Client::builder()
                .redirect(redirect::Policy::none())
                .build()?,
        })
    }
}

fn request_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Prober for HttpProber {
    /// Sends exactly one request and waits for the first terminal event:
    /// a response, a transport error, or the timeout. No retry.
    async fn probe(&self, check: &CheckRecord) -> CheckOutcome {
        let slot = OutcomeSlot::new();
        let timeout = Duration::from_millis(u64::from(check.timeout_seconds) * 1000);

        let request = self
            .client
            .request(request_method(check.method), check.target_url())
            .timeout(timeout)
            .send();
        tokio::pin!(request);
        let timer = tokio::time::sleep(timeout);
        tokio::pin!(timer);

        tokio::select! {
            result = &mut request => match result {
                Ok(response) => {
                    slot.complete(CheckOutcome::Response(response.status().as_u16()));
                }
                Err(e) if e.is_timeout() => {
                    slot.complete(CheckOutcome::Failed(ProbeFailure::Timeout));
                }
                Err(e) => {
                    slot.complete(CheckOutcome::Failed(ProbeFailure::Transport(e.to_string())));
                }
            },
            _ = &mut timer => {
                slot.complete(CheckOutcome::Failed(ProbeFailure::Timeout));
            }
        }

        // The select above always records a terminal event; the fallback arm
        // is unreachable.
        slot.into_outcome()
            .unwrap_or(CheckOutcome::Failed(ProbeFailure::Timeout))
    }
}
