//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build checker → Start supervised run loop
//!     → Start reload sources → Bind status server
//!
//! Supervision (supervisor.rs):
//!     Run loop panics → backoff → restart
//!     Restart budget exhausted → trigger shutdown, exit non-zero
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop run loop → drain HTTP server → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger config reload
//! ```
//!
//! # Design Decisions
//! - Fail fast: configuration and bind errors are fatal at startup
//! - A crashed checker is never silently lost

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{StartupError, StartupOptions};
pub use supervisor::{RestartPolicy, Supervisor, SupervisorError};
