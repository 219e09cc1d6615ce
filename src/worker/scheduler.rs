//! The scheduler loop: one pass immediately at startup, then one per fixed
//! interval until shutdown.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::CheckWorker;

impl CheckWorker {
    /// Executes one monitoring pass: every gathered check is dispatched
    /// concurrently, and the pass completes when all of them have.
    pub async fn run_pass(self: Arc<Self>) {
        let ids = self.gather_all().await;
        if ids.is_empty() {
            debug!("No checks to process this pass");
            return;
        }
        info!(count = ids.len(), "Starting monitoring pass");

        let tasks: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let worker = Arc::clone(&self);
                tokio::spawn(worker.process_check(id))
            })
            .collect();
        for result in join_all(tasks).await {
            if let Err(e) = result {
                error!(error = %e, "Check task aborted unexpectedly");
            }
        }
        debug!("Monitoring pass complete");
    }

    /// Runs passes forever. The interval fires on a fixed cadence regardless
    /// of how long a pass takes; a check whose previous probe is still
    /// outstanding is skipped by the per-id in-flight marker rather than
    /// probed twice. Returns only when the shutdown signal changes.
    pub async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<()>) {
        let mut interval = tokio::time::interval(self.pass_interval);
        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    info!("Shutdown signal received, stopping scheduler loop");
                    break;
                }

                // The first tick fires immediately, giving the startup pass.
                _ = interval.tick() => {
                    let worker = Arc::clone(&self);
                    tokio::spawn(worker.run_pass());
                }
            }
        }
    }
}
