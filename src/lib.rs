//! Periodic HTTP endpoint checker library

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::Config;
pub use health::{Checker, EndpointStatus, State};
pub use http::StatusServer;
pub use lifecycle::Shutdown;
