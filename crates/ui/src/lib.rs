#![forbid(unsafe_code)]

pub mod context;
pub mod host;
pub mod timers;
pub mod vm;

#[cfg(test)]
mod test_harness;

pub use context::{AppContext, QuizApp, build_app_context};
pub use host::{LayoutHold, PresentationHost, PulseEffect, PulseKind, PulseTarget};
pub use timers::{ControllerTimings, TimerKind, TimerSchedule, TimerSet};
pub use vm::{ActivationOutcome, QuizNavigationController, RefreshFailure, RefreshOutcome};
