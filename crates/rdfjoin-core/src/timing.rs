//! Wall-clock measurement for load and join runs.

use std::time::{Duration, Instant};

use tracing::info;

/// Run `f` and log its wall-clock duration under `label`.
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    info!(label, elapsed_us = elapsed.as_micros() as u64, "measured");
    (value, elapsed)
}
