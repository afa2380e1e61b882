//! Exponential backoff computation for delivery retries.

use std::time::Duration;

/// Upper bound on a single retry delay (one hour).
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(3600);

/// Compute the delay before the next attempt of a delivery.
///
/// `attempts` is the number of attempts already made (>= 1). The delay
/// doubles per failed attempt: `base`, `2*base`, `4*base`, ..., capped
/// at [`MAX_RETRY_DELAY`].
pub fn retry_delay(base: Duration, attempts: i32) -> Duration {
    debug_assert!(attempts >= 1, "retry_delay called before any attempt");
    let exponent = (attempts - 1).clamp(0, 30) as u32;
    base.saturating_mul(2u32.saturating_pow(exponent))
        .min(MAX_RETRY_DELAY)
}
