//! Resilience helpers.
//!
//! # Design Decisions
//! - Probes are never retried within a tick; the next tick is the retry
//! - Timeouts are non-negotiable; every fetch has a deadline (see `health::checker`)
//! - Backoff is only used to space out restarts of supervised tasks

pub mod backoff;
