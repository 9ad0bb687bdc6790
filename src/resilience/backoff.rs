//! Exponential backoff.

use std::time::Duration;

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`.
///
/// No jitter, so retry timing is reproducible. Saturates instead of
/// overflowing for absurd attempt counts.
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}
