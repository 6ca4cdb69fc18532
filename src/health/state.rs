//! Endpoint status model.
//!
//! # States
//! - Unknown: configured but never checked
//! - Passing: last check returned 200
//! - Failing: last check returned anything else, or the fetch failed
//!
//! # State Transitions
//! ```text
//! any → same state:      streak += 1
//! any → different state: streak  = 1
//! ```
//!
//! No hysteresis: the state always reflects the latest check.

use serde::Serialize;
use std::fmt;

/// Observed state of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Unknown,
    Passing,
    Failing,
}

impl State {
    /// Classify an HTTP status code. Only 200 passes.
    pub fn from_status_code(code: u16) -> Self {
        if code == 200 {
            State::Passing
        } else {
            State::Failing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            State::Unknown => "unknown",
            State::Passing => "passing",
            State::Failing => "failing",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current status of one configured endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointStatus {
    /// The endpoint URL, unique key into the status store.
    pub endpoint: String,
    pub state: State,
    /// Consecutive checks that produced `state`. Zero until the first check.
    pub streak: u64,
    /// Error detail of the most recent failed fetch, if the last check had one.
    pub last_error: Option<String>,
}

impl EndpointStatus {
    /// Fresh entry for a newly configured endpoint.
    pub fn unknown(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: State::Unknown,
            streak: 0,
            last_error: None,
        }
    }

    /// Compute the status following a check that observed `state`.
    pub fn advance(&self, state: State, last_error: Option<String>) -> Self {
        let streak = if state == self.state {
            self.streak.saturating_add(1)
        } else {
            1
        };

        Self {
            endpoint: self.endpoint.clone(),
            state,
            streak,
            last_error,
        }
    }

    /// True when the previous status had a different state (ignores the first check from Unknown).
    pub fn transitioned_from(&self, previous: &EndpointStatus) -> bool {
        previous.state != State::Unknown && previous.state != self.state
    }
}
