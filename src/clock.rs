use std::time::Instant;

/// Monotonic millisecond clock anchored at construction time.
///
/// All queue timing (time on queue, refresh throttling, gate intervals) is
/// measured against this origin, never against wall time.
#[derive(Debug, Clone)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since this clock was created.
    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
