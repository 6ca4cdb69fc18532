//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize subsystems in dependency order
//! - Start background tasks (supervised run loop, reload sources)
//! - Bind the status listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound before the checker starts, so a bad address never
//!   leaves probes running behind a dead server

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config_blocking, Config, ConfigError, ConfigSource};
use crate::health::{Checker, FetchError, HttpFetcher};
use crate::http::StatusServer;
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::lifecycle::signals;
use crate::lifecycle::supervisor::{RestartPolicy, Supervisor, SupervisorError};
use crate::observability::metrics;

/// Everything the process needs to start, usually built from CLI flags.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub address: String,
    pub source: ConfigSource,
    pub watch: bool,
    pub metrics_address: Option<SocketAddr>,
    pub restart_policy: RestartPolicy,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] FetchError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("checker supervisor task failed: {0}")]
    Join(#[from] JoinError),
}

/// Run the checker and its status server until shutdown.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "simplcheck starting");

    let config = load_config_blocking(options.source.clone()).await?;

    if let Some(addr) = options.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let fetcher = Arc::new(HttpFetcher::new()?);
    let checker = Arc::new(Checker::new(fetcher));
    checker.load_config(&config).await;

    let listener = TcpListener::bind(&options.address)
        .await
        .map_err(|source| StartupError::Bind {
            address: options.address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    signals::spawn_termination_handler(shutdown.clone());

    // Reload sources feed one channel; dropping every sender ends the reload task.
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    let _watcher = match (options.watch, options.source.path()) {
        (true, Some(path)) => Some(ConfigWatcher::new(path, reload_tx.clone()).run()?),
        (true, None) => {
            tracing::warn!("--watch has no effect when reading configuration from stdin");
            None
        }
        (false, _) => None,
    };
    if options.source.path().is_some() {
        signals::spawn_reload_on_hangup(options.source.clone(), reload_tx.clone(), shutdown.clone());
    }
    drop(reload_tx);
    tokio::spawn(apply_reloads(checker.clone(), reload_rx, shutdown.subscribe()));

    let supervised = {
        let checker = checker.clone();
        spawn_supervised("checker", options.restart_policy, shutdown.clone(), move |signal| {
            checker.clone().run(signal)
        })
    };

    let served = StatusServer::new(checker)
        .run(listener, shutdown.subscribe())
        .await;
    shutdown.trigger();

    let supervised = supervised.await?;
    served.map_err(StartupError::Serve)?;
    supervised?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Run `factory`'s task under a [`Supervisor`]. An exhausted restart budget
/// triggers `shutdown` and is returned as an error.
fn spawn_supervised<F, Fut>(
    name: &'static str,
    policy: RestartPolicy,
    shutdown: Shutdown,
    factory: F,
) -> JoinHandle<Result<(), StartupError>>
where
    F: FnMut(ShutdownSignal) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let supervisor = Supervisor::new(policy, shutdown.clone());
    tokio::spawn(async move {
        supervisor.supervise(name, factory).await.map_err(|e| {
            tracing::error!(task = name, error = %e, "Supervision failed, shutting down");
            shutdown.trigger();
            StartupError::from(e)
        })
    })
}

/// Apply reloaded configurations until every reload source is gone or shutdown fires.
async fn apply_reloads(
    checker: Arc<Checker>,
    mut updates: mpsc::UnboundedReceiver<Config>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => checker.load_config(&config).await,
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}
