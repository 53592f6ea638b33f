use std::sync::atomic::{AtomicBool, Ordering};

/// Latch raised by job-stop handlers so a running queue iteration yields the
/// queue lock at its next step.
///
/// This is a hint, not a barrier: `Relaxed` ordering is sufficient, and the
/// iteration only consults it between items.
#[derive(Debug, Default)]
pub struct StopFlag(AtomicBool);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, stopped: bool) {
        self.0.store(stopped, Ordering::Relaxed);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
