//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML) or stdin
//!     → loader.rs (read & deserialize into RawConfig)
//!     → validation.rs (parse durations, reject empty endpoints)
//!     → Config (validated, durations already parsed)
//!     → Checker::load_config
//!
//! On reload (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → Checker::load_config swaps settings and resets the status store
//! ```
//!
//! # Design Decisions
//! - Durations are parsed once, at load time; the run loop never re-parses
//! - A bad reload is logged and the running configuration is kept
//! - Validation separates syntactic (serde) from semantic checks

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_config_blocking, ConfigError, ConfigSource};
pub use schema::{Config, ProbeSettings, RawConfig, RawSettings};
