//! The checker: status store, fetcher and probe settings behind one handle.
//!
//! # Responsibilities
//! - Load a configuration and reset the status store
//! - Probe a single endpoint and record the outcome
//! - Produce report snapshots
//!
//! The periodic run loop lives in `active.rs`.

use arc_swap::ArcSwap;
use dashmap::DashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{Config, ProbeSettings};
use crate::health::fetcher::{FetchError, Fetcher};
use crate::health::state::{EndpointStatus, State};
use crate::health::store::{StatusStore, WriteRejected};
use crate::observability::metrics;

/// Errors returned by [`Checker::check`].
#[derive(Debug, Error)]
pub enum CheckError {
    /// The endpoint is not part of the loaded configuration. Nothing was recorded.
    #[error("cannot check {0}: no associated configuration")]
    UnconfiguredEndpoint(String),

    /// The fetch failed. The failure was still recorded as `status`.
    #[error("check of {} failed: {source}", .status.endpoint)]
    Fetch {
        status: EndpointStatus,
        #[source]
        source: FetchError,
    },

    /// A configuration reload happened while the probe was running; its result was dropped.
    #[error("check of {0} superseded by a configuration reload")]
    Superseded(String),
}

/// Periodic HTTP endpoint checker.
pub struct Checker {
    pub(crate) store: StatusStore,
    fetcher: Arc<dyn Fetcher>,
    settings: ArcSwap<ProbeSettings>,
    /// Endpoints with a probe currently running.
    pub(crate) in_flight: DashSet<String>,
}

impl Checker {
    /// Create a checker with no endpoints configured.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            store: StatusStore::new(),
            fetcher,
            settings: ArcSwap::from_pointee(ProbeSettings::default()),
            in_flight: DashSet::new(),
        }
    }

    /// Replace the active configuration and reset every endpoint to `Unknown`.
    ///
    /// Settings and endpoints are swapped under the same store write lock, so
    /// concurrent loads never mix the two halves of different configurations.
    pub async fn load_config(&self, config: &Config) {
        let settings = Arc::new(config.settings);
        let generation = self
            .store
            .replace_with(config.endpoints.iter().cloned(), || self.settings.store(settings))
            .await;

        metrics::record_endpoints_configured(self.store.len().await);
        tracing::info!(
            endpoints = config.endpoints.len(),
            interval = ?config.settings.interval,
            timeout = ?config.settings.timeout,
            generation,
            "Configuration loaded"
        );
    }

    /// Probe `endpoint` once and record the result.
    pub async fn check(&self, endpoint: &str) -> Result<EndpointStatus, CheckError> {
        let (generation, _) = self
            .store
            .lookup(endpoint)
            .await
            .ok_or_else(|| CheckError::UnconfiguredEndpoint(endpoint.to_string()))?;

        let timeout = self.settings.load().timeout;
        let started = Instant::now();
        let outcome = self.fetch_with_timeout(endpoint, timeout).await;
        let elapsed = started.elapsed();

        let (state, fetch_error) = match outcome {
            Ok(code) => {
                tracing::debug!(endpoint = %endpoint, status = code, elapsed = ?elapsed, "Probe completed");
                (State::from_status_code(code), None)
            }
            Err(e) => (State::Failing, Some(e)),
        };
        let last_error = fetch_error.as_ref().map(ToString::to_string);

        let (previous, status) = self
            .store
            .apply(endpoint, generation, |current| current.advance(state, last_error))
            .await
            .map_err(|rejected| match rejected {
                WriteRejected::Missing => CheckError::UnconfiguredEndpoint(endpoint.to_string()),
                WriteRejected::Superseded => CheckError::Superseded(endpoint.to_string()),
            })?;

        metrics::record_probe(endpoint, state, elapsed);
        metrics::record_streak(endpoint, &status);

        if status.transitioned_from(&previous) {
            match status.state {
                State::Passing => tracing::info!(endpoint = %endpoint, from = %previous.state, "Endpoint recovered"),
                _ => tracing::warn!(endpoint = %endpoint, from = %previous.state, "Endpoint started failing"),
            }
        }

        match fetch_error {
            Some(source) => Err(CheckError::Fetch { status, source }),
            None => Ok(status),
        }
    }

    async fn fetch_with_timeout(&self, endpoint: &str, timeout: Duration) -> Result<u16, FetchError> {
        match tokio::time::timeout(timeout, self.fetcher.fetch(endpoint, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        }
    }

    /// Copies of every endpoint status, sorted by identifier.
    pub async fn report(&self) -> Vec<EndpointStatus> {
        self.store.snapshot().await
    }

    /// Settings from the most recently loaded configuration.
    pub fn settings(&self) -> ProbeSettings {
        **self.settings.load()
    }

    /// True while a probe for `endpoint` is running.
    pub fn is_in_flight(&self, endpoint: &str) -> bool {
        self.in_flight.contains(endpoint)
    }
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("settings", &self.settings())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
