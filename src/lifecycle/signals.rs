//! OS signal handling.
//!
//! # Responsibilities
//! - SIGINT/SIGTERM → graceful shutdown; a second one forces exit
//! - SIGHUP → reload the configuration file
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{Config, ConfigSource};
use crate::lifecycle::shutdown::Shutdown;

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn termination() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Trigger `shutdown` on the first termination signal, exit the process on the second.
pub fn spawn_termination_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        termination().await;
        tracing::info!("Shutdown signal received");
        shutdown.trigger();

        termination().await;
        tracing::warn!("Second shutdown signal received, forcing exit");
        std::process::exit(130);
    })
}

/// Reload `source` into `tx` every time SIGHUP arrives.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(
    source: ConfigSource,
    tx: mpsc::UnboundedSender<Config>,
    shutdown: Shutdown,
) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };
        let mut stop = shutdown.subscribe();

        loop {
            tokio::select! {
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    tracing::info!(source = %source, "SIGHUP received, reloading configuration");
                    let (source, tx) = (source.clone(), tx.clone());
                    let reload = tokio::task::spawn_blocking(move || {
                        crate::config::watcher::reload_into(&source, &tx)
                    });
                    if let Err(e) = reload.await {
                        tracing::error!(error = %e, "Config reload task failed");
                    }
                }
                _ = stop.recv() => break,
            }
        }
    })
}

#[cfg(not(unix))]
pub fn spawn_reload_on_hangup(
    _source: ConfigSource,
    _tx: mpsc::UnboundedSender<Config>,
    _shutdown: Shutdown,
) -> JoinHandle<()> {
    tokio::spawn(async {})
}
