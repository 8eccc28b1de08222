//! Elapsed-time logging for fetches and render passes.

use std::time::{Duration, Instant};

/// Runs `f` and logs how long it took at debug level under `label`.
pub fn measure<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    log_elapsed(label, start.elapsed());
    result
}

/// Logs the time between construction and drop.
#[derive(Debug)]
pub struct TimingGuard {
    label: &'static str,
    start: Instant,
}

impl TimingGuard {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        log_elapsed(self.label, self.start.elapsed());
    }
}

fn log_elapsed(label: &str, elapsed: Duration) {
    tracing::debug!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "{label}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_returns_closure_result() {
        assert_eq!(measure("add", || 2 + 2), 4);
    }

    #[test]
    fn guard_tracks_elapsed_time() {
        let guard = TimingGuard::new("sleep");
        std::thread::sleep(Duration::from_millis(2));
        assert!(guard.elapsed() >= Duration::from_millis(2));
    }
}
