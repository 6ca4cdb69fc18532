//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before attempt number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at `max`, plus up to 10% jitter.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.saturating_pow(attempt - 1);
    let capped = base.saturating_mul(factor).min(max);

    let jitter_range = capped.as_millis() as u64 / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    capped + Duration::from_millis(jitter)
}
