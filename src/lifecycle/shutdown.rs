//! Shutdown coordination.

use std::sync::Arc;
use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Cloneable; any clone may trigger. Subscribers created after the trigger
/// observe it immediately, which matters for tasks restarted by the supervisor.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to long-running tasks.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once shutdown has been triggered (or every coordinator is gone).
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
