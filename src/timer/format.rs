//! Human-readable elapsed time.

use std::time::Duration;

/// Format `elapsed` with sub-millisecond precision.
///
/// Durations under a second are shown in milliseconds (`"12.345ms"`),
/// longer ones in seconds (`"3.250s"`).
pub fn format_duration(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{:.3}ms", elapsed.as_secs_f64() * 1_000.0)
    } else {
        format!("{:.3}s", elapsed.as_secs_f64())
    }
}
