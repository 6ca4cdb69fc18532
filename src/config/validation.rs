//! Configuration validation.
//!
//! Serde handles the shape of the document; this module turns duration strings
//! into [`Duration`]s and rejects values the checker cannot run with. Every
//! problem is reported, not just the first one.

use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::config::duration::{parse_duration, DurationError};
use crate::config::schema::{Config, ProbeSettings, RawConfig};

/// A single semantic problem in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("settings.interval: {0}")]
    Interval(DurationError),

    #[error("settings.interval must be greater than zero")]
    ZeroInterval,

    #[error("settings.timeout: {0}")]
    Timeout(DurationError),

    #[error("settings.timeout must be greater than zero")]
    ZeroTimeout,

    #[error("applications[{0}] is empty")]
    EmptyEndpoint(usize),
}

/// Validate a raw document and produce the checker's [`Config`].
pub fn validate(raw: RawConfig) -> Result<Config, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let interval = check_duration(
        &raw.settings.interval,
        ValidationError::Interval,
        ValidationError::ZeroInterval,
        &mut errors,
    );
    let timeout = check_duration(
        &raw.settings.timeout,
        ValidationError::Timeout,
        ValidationError::ZeroTimeout,
        &mut errors,
    );

    let mut seen = HashSet::new();
    let mut endpoints = Vec::with_capacity(raw.applications.len());
    for (index, endpoint) in raw.applications.into_iter().enumerate() {
        let endpoint = endpoint.trim().to_string();
        if endpoint.is_empty() {
            errors.push(ValidationError::EmptyEndpoint(index));
            continue;
        }
        if !seen.insert(endpoint.clone()) {
            tracing::warn!(endpoint = %endpoint, "Duplicate endpoint in configuration, keeping one entry");
            continue;
        }
        endpoints.push(endpoint);
    }

    match (interval, timeout) {
        (Some(interval), Some(timeout)) if errors.is_empty() => Ok(Config {
            settings: ProbeSettings { interval, timeout },
            endpoints,
        }),
        _ => Err(errors),
    }
}

fn check_duration(
    value: &str,
    parse_error: fn(DurationError) -> ValidationError,
    zero_error: ValidationError,
    errors: &mut Vec<ValidationError>,
) -> Option<Duration> {
    match parse_duration(value) {
        Ok(d) if d.is_zero() => {
            errors.push(zero_error);
            None
        }
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(parse_error(e));
            None
        }
    }
}
