//! Fixed-step accumulator and clocks.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source for the loop.
pub trait Clock: Send {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// A clock whose origin is now.
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

/// Clock that only moves when told to.
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// A clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Lag accumulator for a fixed simulation step.
///
/// All arithmetic is on integer `Duration`s, so feeding exactly `k` steps
/// worth of time yields exactly `k` steps and no remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    step: Duration,
    lag: Duration,
}

impl FixedStep {
    /// An accumulator for `step`. A zero step is raised to one nanosecond.
    pub fn new(step: Duration) -> Self {
        Self {
            step: step.max(Duration::from_nanos(1)),
            lag: Duration::ZERO,
        }
    }

    /// Length of one step.
    #[inline]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Unsimulated time.
    #[inline]
    pub const fn lag(&self) -> Duration {
        self.lag
    }

    /// Add elapsed wall time.
    #[inline]
    pub fn accumulate(&mut self, elapsed: Duration) {
        self.lag += elapsed;
    }

    /// Consume one step of lag if available.
    #[inline]
    pub fn next_step(&mut self) -> bool {
        if self.lag >= self.step {
            self.lag -= self.step;
            true
        } else {
            false
        }
    }

    /// Fraction of a step left over, in `[0, 1)`.
    pub fn delta(&self) -> f32 {
        (self.lag.as_secs_f64() / self.step.as_secs_f64()) as f32
    }
}
