//! HTTP status endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request id, tracing, timeout)
//!     → Checker::report (snapshot copy)
//!     → render.rs (text, HTML or JSON)
//!     → Send to client
//! ```

pub mod render;
pub mod request;
pub mod server;

pub use render::ReportFormat;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::StatusServer;
