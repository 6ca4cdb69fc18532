//! Supervision of long-running background tasks.
//!
//! A supervised task is spawned from a factory so it can be started again
//! after a panic. Restarts are spaced with exponential backoff; once the
//! restart budget is spent, supervision fails and the caller is expected to
//! shut the process down.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// How often, and how fast, a crashed task is restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Restarts allowed before giving up.
    pub max_restarts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("task {name} crashed {crashes} times, giving up")]
    RestartsExhausted { name: String, crashes: u32 },
}

/// Runs tasks under a [`RestartPolicy`], stopping on shutdown.
#[derive(Debug, Clone)]
pub struct Supervisor {
    policy: RestartPolicy,
    shutdown: Shutdown,
}

impl Supervisor {
    pub fn new(policy: RestartPolicy, shutdown: Shutdown) -> Self {
        Self { policy, shutdown }
    }

    /// Run the task produced by `factory` until it returns or shutdown fires.
    ///
    /// Each (re)start gets a fresh [`ShutdownSignal`].
    pub async fn supervise<F, Fut>(&self, name: &str, mut factory: F) -> Result<(), SupervisorError>
    where
        F: FnMut(ShutdownSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut crashes = 0;

        loop {
            let handle = tokio::spawn(factory(self.shutdown.subscribe()));

            let error = match handle.await {
                Ok(()) => {
                    tracing::info!(task = name, "Supervised task exited");
                    return Ok(());
                }
                Err(e) if e.is_cancelled() => {
                    tracing::info!(task = name, "Supervised task cancelled");
                    return Ok(());
                }
                Err(e) => e,
            };

            crashes += 1;
            if self.shutdown.is_triggered() {
                tracing::warn!(task = name, error = %error, "Supervised task crashed during shutdown");
                return Ok(());
            }
            if crashes > self.policy.max_restarts {
                tracing::error!(task = name, error = %error, crashes, "Supervised task exceeded restart budget");
                return Err(SupervisorError::RestartsExhausted {
                    name: name.to_string(),
                    crashes,
                });
            }

            let delay = calculate_backoff(crashes, self.policy.base_delay, self.policy.max_delay);
            tracing::error!(
                task = name,
                error = %error,
                restart = crashes,
                delay = ?delay,
                "Supervised task crashed, restarting"
            );
            metrics::record_task_restart(name);

            let mut stop = self.shutdown.subscribe();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = stop.recv() => return Ok(()),
            }
        }
    }
}
