//! Throttle decision
//!
//! A single edge: either at least `window` has elapsed since the last pass,
//! or it has not. `last = None` (never passed) is infinitely far in the
//! past, and a non-positive window lets every invocation through.

use chrono::{DateTime, Duration, Utc};

/// Whether an invocation at `now` may pass
pub fn should_pass(now: DateTime<Utc>, last: Option<DateTime<Utc>>, window: Duration) -> bool {
    if window <= Duration::zero() {
        return true;
    }

    match last {
        None => true,
        // A clock that stepped back yields a negative elapsed time and blocks
        Some(last) => now.signed_duration_since(last) >= window,
    }
}

/// Time left until an invocation would pass, or `None` if it would pass now
pub fn remaining(
    now: DateTime<Utc>,
    last: Option<DateTime<Utc>>,
    window: Duration,
) -> Option<Duration> {
    if should_pass(now, last, window) {
        return None;
    }

    // Saturates when a stepped-back clock pushes the result past the range
    last.map(|last| {
        window
            .checked_sub(&now.signed_duration_since(last))
            .unwrap_or(Duration::MAX)
    })
}
