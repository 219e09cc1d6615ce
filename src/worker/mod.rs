//! The check monitoring worker: loads check records, probes each endpoint
//! once per pass, persists state transitions, and alerts owners on change.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashSet;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::models::{CheckOutcome, CheckRecord};
use crate::notifications::{alert_message, AlertDispatcher};
use crate::store::{CheckStore, CHECKS_COLLECTION};

pub mod outcome;
pub mod probe;
pub mod scheduler;
pub mod validator;

pub use probe::{HttpProber, Prober};

/// Drives the monitoring passes. All collaborators are injected so tests can
/// substitute in-memory fakes for the store, the prober, and the dispatcher.
pub struct CheckWorker {
    store: Arc<dyn CheckStore>,
    dispatcher: Arc<dyn AlertDispatcher>,
    prober: Arc<dyn Prober>,
    // Bounds the number of simultaneous outbound probes across passes.
    probe_permits: Arc<Semaphore>,
    // Ids with a probe still outstanding; an overlapping pass skips them.
    in_flight: DashSet<String>,
    pass_interval: Duration,
}

impl CheckWorker {
    pub fn new(
        store: Arc<dyn CheckStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
        prober: Arc<dyn Prober>,
        pass_interval: Duration,
        max_concurrent_probes: usize,
    ) -> Self {
        Self {
            store,
            dispatcher,
            prober,
            probe_permits: Arc::new(Semaphore::new(max_concurrent_probes)),
            in_flight: DashSet::new(),
            pass_interval,
        }
    }

    /// Lists every check id due for this pass. A listing failure loses the
    /// pass, not the worker.
    pub async fn gather_all(&self) -> Vec<String> {
        match self.store.list(CHECKS_COLLECTION).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Could not list checks to process");
                Vec::new()
            }
        }
    }

    /// Runs the full lifecycle for one check: load, validate, probe, process.
    /// Every failure is contained here; nothing propagates to the pass.
    pub async fn process_check(self: Arc<Self>, id: String) {
        if !self.in_flight.insert(id.clone()) {
            debug!(check_id = %id, "Previous probe still outstanding, skipping this cycle");
            return;
        }
        let permit = match self.probe_permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                // Semaphore closed only on shutdown.
                self.in_flight.remove(&id);
                return;
            }
        };
        self.probe_once(&id).await;
        drop(permit);
        self.in_flight.remove(&id);
    }

    async fn probe_once(&self, id: &str) {
        let raw = match self.store.read(CHECKS_COLLECTION, id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(check_id = %id, error = %e, "Error reading check data, skipping");
                return;
            }
        };
        let record = match validator::validate(&raw) {
            Ok(record) => record,
            Err(reason) => {
                warn!(check_id = %id, %reason, "Check is not properly formatted, skipping");
                return;
            }
        };
        let outcome = self.prober.probe(&record).await;
        self.process_outcome(record, outcome).await;
    }

    /// Folds a probe outcome into the stored record and alerts the owner on
    /// a state transition.
    ///
    /// The record is persisted unconditionally so `lastChecked` stays fresh.
    /// If persistence fails the on-disk state is not trustworthy and no alert
    /// is sent (fail-closed). A dispatch failure is logged only; it neither
    /// rolls back the persisted state nor is retried.
    pub async fn process_outcome(&self, record: CheckRecord, outcome: CheckOutcome) {
        let (new_state, alert_warranted) = outcome::evaluate(&record, &outcome);
        debug!(check_id = %record.id, ?outcome, %new_state, "Processed probe outcome");

        let mut updated = record;
        updated.state = new_state;
        updated.last_checked = Some(Utc::now());

        let value = match serde_json::to_value(&updated) {
            Ok(value) => value,
            Err(e) => {
                error!(check_id = %updated.id, error = %e, "Could not serialize check update");
                return;
            }
        };
        if let Err(e) = self.store.update(CHECKS_COLLECTION, &updated.id, &value).await {
            error!(
                check_id = %updated.id,
                error = %e,
                "Error saving check update, suppressing any alert this cycle"
            );
            return;
        }

        if !alert_warranted {
            debug!(check_id = %updated.id, "Check state has not changed, no alert needed");
            return;
        }
        let message = alert_message(&updated);
        match self.dispatcher.send(&updated.user_ref, &message).await {
            Ok(()) => {
                info!(check_id = %updated.id, state = %updated.state, "Alerted owner to state change");
            }
            Err(e) => {
                warn!(
                    check_id = %updated.id,
                    error = %e,
                    "Could not deliver state change alert"
                );
            }
        }
    }
}
