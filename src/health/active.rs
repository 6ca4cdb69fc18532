//! Active health checking: the periodic run loop.
//!
//! # Responsibilities
//! - Once per interval, spawn one probe per configured endpoint
//! - Skip endpoints whose previous probe is still running
//! - Reap finished probe tasks and report panics
//! - Stop and abort outstanding probes on shutdown

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time;

use crate::health::checker::{CheckError, Checker};
use crate::health::state::EndpointStatus;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Removes an endpoint from the in-flight set when the probe ends, even on panic or abort.
struct InFlightGuard {
    checker: Arc<Checker>,
    endpoint: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.checker.in_flight.remove(&self.endpoint);
    }
}

impl Checker {
    /// Run the tick loop until `shutdown` fires.
    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownSignal) {
        tracing::info!(interval = ?self.settings().interval, "Checker run loop starting");

        let mut probes = JoinSet::new();

        loop {
            reap(&mut probes);
            self.dispatch(&mut probes).await;

            // Re-read every tick so a reload changes the pace.
            let interval = self.settings().interval;
            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Checker received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        probes.shutdown().await;
        tracing::info!("Checker run loop stopped");
    }

    /// Spawn one probe per configured endpoint into `probes`. Returns how many were spawned.
    pub async fn dispatch(self: &Arc<Self>, probes: &mut JoinSet<()>) -> usize {
        let endpoints = self.store.endpoints().await;
        let mut dispatched = 0;

        for endpoint in endpoints {
            if !self.in_flight.insert(endpoint.clone()) {
                tracing::debug!(endpoint = %endpoint, "Previous probe still in flight, skipping");
                metrics::record_probe_skipped(&endpoint);
                continue;
            }

            let guard = InFlightGuard {
                checker: Arc::clone(self),
                endpoint,
            };
            probes.spawn(async move {
                let result = guard.checker.check(&guard.endpoint).await;
                log_outcome(&guard.endpoint, result);
            });
            dispatched += 1;
        }

        metrics::record_cycle(dispatched);
        tracing::debug!(dispatched, "Probe cycle dispatched");
        dispatched
    }
}

fn log_outcome(endpoint: &str, result: Result<EndpointStatus, CheckError>) {
    match result {
        Ok(_) => {}
        Err(CheckError::Fetch { status, source }) => {
            tracing::warn!(endpoint = %endpoint, streak = status.streak, error = %source, "Probe failed");
        }
        Err(e @ CheckError::Superseded(_)) | Err(e @ CheckError::UnconfiguredEndpoint(_)) => {
            tracing::debug!(endpoint = %endpoint, reason = %e, "Probe result discarded");
        }
    }
}

fn reap(probes: &mut JoinSet<()>) {
    while let Some(result) = probes.try_join_next() {
        if let Err(e) = result {
            if e.is_panic() {
                tracing::error!(error = %e, "Probe task panicked");
            }
        }
    }
}
