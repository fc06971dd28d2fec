//! Elapsed-time logging around table-level operations.

use std::time::Instant;

/// Runs `f`, logging the operation name and how long it took.
pub(crate) fn timed<T>(operation: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    log::debug!("{} started", operation);
    let out = f();
    log::info!("{} took {:.3?}", operation, start.elapsed());
    out
}
