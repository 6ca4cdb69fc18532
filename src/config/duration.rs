//! Duration strings ("5s", "250ms", "1m30s", "1.5h").
//!
//! Accepts a sequence of decimal numbers, each with an optional fraction and a
//! mandatory unit suffix. Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`.
//! One leading `+` is allowed. A bare `0` is the only unit-less value accepted.

use std::time::Duration;
use thiserror::Error;

/// Errors produced when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} overflows")]
    Overflow(String),
}

const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parse a duration string into a [`Duration`].
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    let s = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if s.is_empty() {
        return Err(DurationError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || DurationError::Invalid(input.to_string());
    let overflow = || DurationError::Overflow(input.to_string());

    let mut rest = s;
    let mut total_nanos: u128 = 0;

    while !rest.is_empty() {
        // Number: integer part with optional fraction.
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..num_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return Err(invalid());
        }
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        rest = &rest[unit_len..];

        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| DurationError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

        let (whole, frac) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        // Fractional digits beyond nanosecond precision are dropped.
        let mut divisor: u128 = 1;
        let mut frac_value: u128 = 0;
        for digit in frac.chars().take(18) {
            let d = digit.to_digit(10).ok_or_else(invalid)? as u128;
            frac_value = frac_value * 10 + d;
            divisor *= 10;
        }
        nanos = nanos
            .checked_add(frac_value * scale / divisor)
            .ok_or_else(overflow)?;

        total_nanos = total_nanos.checked_add(nanos).ok_or_else(overflow)?;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000).map_err(|_| overflow())?;
    let sub_nanos = (total_nanos % 1_000_000_000) as u32;
    Ok(Duration::new(secs, sub_nanos))
}
