//! Configuration schema definitions.
//!
//! `RawConfig` mirrors the document on disk. `Config` is the validated form the
//! checker consumes, with durations already parsed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default fetch timeout applied when `settings.timeout` is omitted.
pub const DEFAULT_TIMEOUT: &str = "10s";

/// Root of the configuration document.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RawConfig {
    /// Global probe settings.
    pub settings: RawSettings,

    /// Endpoint identifiers (URLs) to probe.
    pub applications: Vec<String>,
}

/// Global probe settings as written in the document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RawSettings {
    /// Time between two ticks of the run loop (e.g. "5s").
    pub interval: String,

    /// Upper bound for a single fetch (e.g. "10s").
    pub timeout: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            interval: String::new(),
            timeout: DEFAULT_TIMEOUT.to_string(),
        }
    }
}

/// Probe settings shared by every endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub settings: ProbeSettings,
    pub endpoints: Vec<String>,
}

impl Config {
    /// Build a configuration directly, mostly useful for tests and embedding.
    pub fn new(interval: Duration, endpoints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            settings: ProbeSettings {
                interval,
                ..ProbeSettings::default()
            },
            endpoints: endpoints.into_iter().map(Into::into).collect(),
        }
    }

    /// Override the fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }
}
