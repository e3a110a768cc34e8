//! Monotonic timing sources
//!
//! Each path of an experiment runs under a scoped clock reading. The source
//! is injected once at construction and shared by every invocation, so the
//! engine itself stays deterministic and testable: production code keeps the
//! default [`SystemClock`], tests inject a [`ManualClock`] and drive it by
//! hand.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Monotonic timestamp source.
///
/// Implementations return the time elapsed since an arbitrary fixed epoch.
/// Readings are only ever subtracted from one another, so the epoch itself
/// is meaningless; it must simply never move backwards.
pub trait Clock: Send + Sync {
    /// Current reading of the clock.
    fn now(&self) -> Duration;
}

/// Platform monotonic clock backed by [`std::time::Instant`].
///
/// Anchored at construction. One instance is resolved per experiment and
/// reused across calls, never re-derived per invocation.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic tests.
///
/// Starts at zero and only moves when [`advance`](Self::advance) is called.
/// Clones share the same reading, so a test can keep one handle to drive
/// time while the experiment owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    reading: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut reading = self.reading.lock().unwrap_or_else(PoisonError::into_inner);
        *reading += step;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
