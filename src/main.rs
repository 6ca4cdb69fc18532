//! simplcheck
//!
//! Periodically probes a list of HTTP endpoints and serves their pass/fail
//! streaks over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     config file / stdin
//!            │
//!            ▼
//!     ┌─────────────┐   reload (notify, SIGHUP)
//!     │   config    │◀──────────────────────────┐
//!     └──────┬──────┘                           │
//!            ▼                                  │
//!     ┌─────────────┐   tick    ┌───────────┐   │
//!     │   Checker   │──────────▶│  Fetcher  │──────▶ endpoints
//!     │ status store│◀──────────│ (reqwest) │   │
//!     └──────┬──────┘  outcome  └───────────┘   │
//!            │ report                           │
//!            ▼                                  │
//!     ┌─────────────┐                    ┌──────┴──────┐
//!     │ http server │◀── GET / ──clients │  lifecycle  │
//!     └─────────────┘                    │ supervisor  │
//!                                        │  shutdown   │
//!                                        └─────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;

use simplcheck::config::ConfigSource;
use simplcheck::lifecycle::{startup, RestartPolicy, StartupOptions};
use simplcheck::observability::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "simplcheck")]
#[command(about = "Periodic HTTP endpoint checker", long_about = None)]
struct Cli {
    /// Address the status server listens on
    #[arg(long, default_value = "0.0.0.0:80")]
    address: String,

    /// Configuration file, `-` for stdin
    #[arg(long, default_value = "-")]
    conf: String,

    /// Reload the configuration file when it changes
    #[arg(long)]
    watch: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Crashes of the checker loop tolerated before exiting
    #[arg(long, default_value_t = 5)]
    max_restarts: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let options = StartupOptions {
        address: cli.address,
        source: ConfigSource::from_arg(&cli.conf),
        watch: cli.watch,
        metrics_address: cli.metrics_address,
        restart_policy: RestartPolicy {
            max_restarts: cli.max_restarts,
            ..RestartPolicy::default()
        },
    };

    if let Err(e) = startup::run(options).await {
        tracing::error!(error = %e, "simplcheck failed");
        return Err(e.into());
    }
    Ok(())
}
