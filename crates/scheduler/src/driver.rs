//! Fixed-cadence driving of a per-tick step function.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Source of "time since the session started" plus a way to wait for it.
pub trait Clock {
    fn now(&self) -> Duration;
    fn sleep_until(&mut self, deadline: Duration);
}

/// Real time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
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
        self.start.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        let wait = deadline.saturating_sub(self.now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}

/// Clock that only moves when told to. Sleeping jumps straight to the deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

/// Fixed-period tick schedule with bounded catch-up.
///
/// Hosts that are woken by someone else (a window's redraw callback) ask
/// [`FixedRate::due`] how many ticks to run. After a long stall only
/// `max_catch_up` ticks run and the schedule restarts from now.
#[derive(Debug, Clone)]
pub struct FixedRate {
    period: Duration,
    next: Duration,
    max_catch_up: u32,
}

impl FixedRate {
    /// `period` must be non-zero; zero is treated as one nanosecond.
    pub fn new(period: Duration, max_catch_up: u32) -> Self {
        Self {
            period: period.max(Duration::from_nanos(1)),
            next: Duration::ZERO,
            max_catch_up: max_catch_up.max(1),
        }
    }

    /// `None` unless `1 / hz` seconds is a non-zero [`Duration`].
    pub fn from_hz(hz: f64, max_catch_up: u32) -> Option<Self> {
        let period = Duration::try_from_secs_f64(1.0 / hz).ok()?;
        (!period.is_zero()).then(|| Self::new(period, max_catch_up))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next tick is due.
    pub fn next_deadline(&self) -> Duration {
        self.next
    }

    /// Number of ticks to run at `now`, consuming them from the schedule.
    pub fn due(&mut self, now: Duration) -> u32 {
        if now < self.next {
            return 0;
        }
        let behind = (now - self.next).as_nanos() / self.period.as_nanos() + 1;
        if behind > self.max_catch_up as u128 {
            tracing::debug!(
                behind = behind as u64,
                max = self.max_catch_up,
                "tick schedule fell behind, resyncing"
            );
            self.next = now + self.period;
            return self.max_catch_up;
        }
        // behind <= max_catch_up, so it fits in u32
        let ticks = behind as u32;
        self.next += self.period * ticks;
        ticks
    }
}

/// Cloneable flag that asks a running [`Scheduler`] to stop after its current tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Calls a step function once per period until stopped.
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    clock: C,
    rate: FixedRate,
    stop: StopHandle,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C, rate: FixedRate) -> Self {
        Self {
            clock,
            rate,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run ticks until `step` breaks, the stop handle fires, or `max_ticks`
    /// have run. `step` receives the clock time for its tick. Returns the
    /// number of ticks run.
    pub fn run<F>(&mut self, max_ticks: Option<u64>, mut step: F) -> u64
    where
        F: FnMut(Duration) -> ControlFlow<()>,
    {
        let mut ran = 0u64;
        tracing::info!(period = ?self.rate.period(), ?max_ticks, "scheduler started");
        'outer: loop {
            if self.stop.is_stopped() || max_ticks.is_some_and(|max| ran >= max) {
                break;
            }
            self.clock.sleep_until(self.rate.next_deadline());
            let due = self.rate.due(self.clock.now());
            for _ in 0..due {
                if self.stop.is_stopped() || max_ticks.is_some_and(|max| ran >= max) {
                    break 'outer;
                }
                ran += 1;
                if step(self.clock.now()).is_break() {
                    break 'outer;
                }
            }
        }
        tracing::info!(ticks = ran, "scheduler stopped");
        ran
    }
}
