use std::cell::Cell;
use std::time::{Duration, Instant};

/// Simulated time, measured from the start of the run.
pub type SimTime = Duration;

/// Source of the `now` value handed to every tick.
pub trait Clock {
    fn now(&self) -> SimTime;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        MonotonicClock { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> SimTime {
        self.start.elapsed()
    }
}

/// Deterministic clock that advances by a fixed step every time it is read.
/// The first reading is zero.
#[derive(Debug)]
pub struct SteppedClock {
    step: Duration,
    next: Cell<SimTime>,
}

impl SteppedClock {
    pub fn new(step: Duration) -> Self {
        SteppedClock { step, next: Cell::new(Duration::ZERO) }
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> SimTime {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Time elapsed from `since` to `now`, zero if `since` lies in the future.
pub fn elapsed(now: SimTime, since: SimTime) -> Duration {
    now.saturating_sub(since)
}
