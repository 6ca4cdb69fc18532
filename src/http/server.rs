//! HTTP status server.
//!
//! # Responsibilities
//! - Serve the checker's report on `/` (text, HTML or JSON)
//! - 404 on every other path
//! - Wire up middleware (request id, tracing, timeout)
//! - Stop gracefully on the shared shutdown signal

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{self, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::health::Checker;
use crate::http::render::{render_html, render_json, render_text, ReportFormat};
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Default upper bound for serving one request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<Checker>,
}

/// HTTP server exposing the status report.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(checker: Arc<Checker>) -> Self {
        Self::with_request_timeout(checker, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(checker: Arc<Checker>, request_timeout: Duration) -> Self {
        let state = AppState { checker };
        Self {
            router: Self::build_router(state, request_timeout),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/", get(status_handler))
            .fallback(not_found)
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Status server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!("Status server stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    format: Option<String>,
}

async fn status_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
    headers: HeaderMap,
) -> Response {
    let format = match query.format.as_deref() {
        Some(value) => match ReportFormat::from_query(value) {
            Some(format) => format,
            None => {
                return (StatusCode::BAD_REQUEST, format!("unknown format {value:?}\n")).into_response();
            }
        },
        None => ReportFormat::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())),
    };

    let report = state.checker.report().await;
    metrics::record_report_request(format.as_str());
    tracing::debug!(endpoints = report.len(), format = format.as_str(), "Serving report");

    match format {
        ReportFormat::Text => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            render_text(&report),
        )
            .into_response(),
        ReportFormat::Html => response::Html(render_html(&report)).into_response(),
        ReportFormat::Json => Json(render_json(&report)).into_response(),
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found\n")
}
