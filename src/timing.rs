// File: ./src/timing.rs
use std::time::Instant;

/// Logs how long an operation took when dropped.
pub struct Timer {
    operation: String,
    start: Instant,
}

impl Timer {
    pub fn start(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "{} took {:.2}s",
            self.operation,
            self.start.elapsed().as_secs_f64()
        );
    }
}
