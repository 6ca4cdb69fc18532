//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Checker, supervisor, HTTP server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional, --metrics-address)
//! ```

pub mod logging;
pub mod metrics;
