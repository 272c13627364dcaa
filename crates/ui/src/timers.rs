//! Recurring background timers owned by the navigation controller.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const REFRESH_WARM_UP: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);
pub const PULSE_WARM_UP: Duration = Duration::from_secs(5);
pub const PULSE_PERIOD: Duration = Duration::from_secs(20);

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A warm-up delay after which a fixed-period interval begins.
///
/// The interval's own first period elapses before the first tick, so ticks
/// land at `warm_up + period`, `warm_up + 2 * period`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSchedule {
    pub warm_up: Duration,
    pub period: Duration,
}

impl TimerSchedule {
    #[must_use]
    pub const fn new(warm_up: Duration, period: Duration) -> Self {
        Self { warm_up, period }
    }

    #[must_use]
    pub fn first_tick(&self) -> Duration {
        self.warm_up + self.period()
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period.max(MIN_PERIOD)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerTimings {
    pub refresh: TimerSchedule,
    pub pulse: TimerSchedule,
}

impl Default for ControllerTimings {
    fn default() -> Self {
        Self {
            refresh: TimerSchedule::new(REFRESH_WARM_UP, DEFAULT_POLL_INTERVAL),
            pulse: TimerSchedule::new(PULSE_WARM_UP, PULSE_PERIOD),
        }
    }
}

impl ControllerTimings {
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.refresh.period = interval;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Refresh,
    Pulse,
}

/// Handles of the running timers.
///
/// `start` ignores a kind that is already running and `stop` may be called any
/// number of times. Dropping the set stops every timer.
#[derive(Debug, Default)]
pub struct TimerSet {
    refresh: Option<JoinHandle<()>>,
    pulse: Option<JoinHandle<()>>,
}

impl TimerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a timer that calls `on_tick` per schedule until it returns
    /// `ControlFlow::Break`. Returns `false` if that timer was already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&mut self, kind: TimerKind, schedule: TimerSchedule, mut on_tick: F) -> bool
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let slot = self.slot_mut(kind);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + schedule.first_tick(), schedule.period());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });
        *slot = Some(handle);
        true
    }

    pub fn stop(&mut self) {
        for handle in [self.refresh.take(), self.pulse.take()].into_iter().flatten() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self, kind: TimerKind) -> bool {
        let slot = match kind {
            TimerKind::Refresh => &self.refresh,
            TimerKind::Pulse => &self.pulse,
        };
        slot.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            TimerKind::Refresh => &mut self.refresh,
            TimerKind::Pulse => &mut self.pulse,
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.stop();
    }
}
