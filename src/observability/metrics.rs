//! Metrics collection and exposition.
//!
//! # Metrics
//! - `simplcheck_probes_total` (counter): probes by endpoint and resulting state
//! - `simplcheck_probe_duration_seconds` (histogram): fetch latency by endpoint
//! - `simplcheck_endpoint_streak` (gauge): current streak by endpoint, negative while failing
//! - `simplcheck_probes_skipped_total` (counter): probes skipped because one was in flight
//! - `simplcheck_probe_cycles_total` (counter) and `simplcheck_probes_dispatched` (gauge)
//! - `simplcheck_endpoints_configured` (gauge)
//! - `simplcheck_report_requests_total` (counter): status page hits by format
//! - `simplcheck_task_restarts_total` (counter): supervised task restarts
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

use crate::health::state::{EndpointStatus, State};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(endpoint: &str, state: State, elapsed: Duration) {
    counter!(
        "simplcheck_probes_total",
        "endpoint" => endpoint.to_string(),
        "state" => state.as_str()
    )
    .increment(1);
    histogram!("simplcheck_probe_duration_seconds", "endpoint" => endpoint.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_streak(endpoint: &str, status: &EndpointStatus) {
    // Positive for passing streaks, negative for failing ones.
    let signed = match status.state {
        State::Passing => status.streak as f64,
        State::Failing => -(status.streak as f64),
        State::Unknown => 0.0,
    };
    gauge!("simplcheck_endpoint_streak", "endpoint" => endpoint.to_string()).set(signed);
}

pub fn record_probe_skipped(endpoint: &str) {
    counter!("simplcheck_probes_skipped_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_cycle(dispatched: usize) {
    counter!("simplcheck_probe_cycles_total").increment(1);
    gauge!("simplcheck_probes_dispatched").set(dispatched as f64);
}

pub fn record_endpoints_configured(count: usize) {
    gauge!("simplcheck_endpoints_configured").set(count as f64);
}

pub fn record_report_request(format: &'static str) {
    counter!("simplcheck_report_requests_total", "format" => format).increment(1);
}

pub fn record_task_restart(task: &str) {
    counter!("simplcheck_task_restarts_total", "task" => task.to_string()).increment(1);
}
