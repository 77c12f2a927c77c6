use std::sync::Mutex;

/// Counters for overlay generation outcomes, including renders that were
/// superseded by a newer generation before their result was applied.
pub struct RenderMetrics {
    inner: Mutex<Counters>,
}

struct Counters {
    completed: usize,
    failed: usize,
    stale_discarded: usize,
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters {
                completed: 0,
                failed: 0,
                stale_discarded: 0,
            }),
        }
    }

    pub fn record_completed(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.completed += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.failed += 1;
        }
    }

    pub fn record_stale_discarded(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.stale_discarded += 1;
        }
    }

    pub fn snapshot(&self) -> (usize, usize, usize) {
        if let Ok(counters) = self.inner.lock() {
            (counters.completed, counters.failed, counters.stale_discarded)
        } else {
            (0, 0, 0)
        }
    }
}

impl Default for RenderMetrics {
    fn default() -> Self {
        Self::new()
    }
}
