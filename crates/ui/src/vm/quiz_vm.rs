use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, error, info, warn};
use quiz_core::model::{QuizId, QuizItem, QuizMetadata};
use quiz_core::{Clock, NavigationState};
use services::{FailureKind, QuizDataSource, QuizSourceError, RunMode};

use crate::host::{PresentationHost, PulseEffect, PulseTarget};
use crate::timers::{ControllerTimings, TimerKind, TimerSet};

pub const ITEMS_NOT_LOADED_MESSAGE: &str =
    "One or more quiz items were not loaded properly. Please contact IT Support.";
pub const SERVER_UNREACHABLE_MESSAGE: &str =
    "The quiz cannot read data from the server. Please check your Internet connection.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshFailure {
    Unauthorized,
    TransportFailure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New items replaced the old ones. `consistent` is false when the count
    /// differs from the one announced in the quiz metadata.
    Applied { count: usize, consistent: bool },
    /// The backend answered with no items; nothing changed.
    Empty,
    Failed(RefreshFailure),
    /// A request issued later already landed; this response was dropped.
    Stale,
    /// The controller was not active when the request was issued or answered.
    Inactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    Idle,
    Loaded(RefreshOutcome),
}

#[derive(Default)]
struct ControllerState {
    nav: NavigationState,
    metadata: Option<QuizMetadata>,
    browse_mode: bool,
    active: bool,
    message: Option<String>,
    issued_requests: u64,
    applied_request: u64,
}

/// Host calls collected under the state lock and replayed after it is released.
#[derive(Default)]
struct HostEffects {
    navigate_to_auth: bool,
    display: Option<Option<QuizItem>>,
    warning: Option<Option<String>>,
}

struct Shared {
    source: Arc<dyn QuizDataSource>,
    host: Arc<dyn PresentationHost>,
    clock: Clock,
    timings: ControllerTimings,
    state: Mutex<ControllerState>,
    timers: Mutex<TimerSet>,
    // Held from applying a change until the host has seen it, so hosts
    // observe changes in the order they were applied.
    host_order: Mutex<()>,
}

/// Keeps the question screen in sync with the backend.
///
/// Owns the loaded items, the current position, the derived prev/next
/// pointers and the two background timers (server polling and the question
/// pulse). Clones share the same state.
#[derive(Clone)]
pub struct QuizNavigationController {
    shared: Arc<Shared>,
}

impl QuizNavigationController {
    #[must_use]
    pub fn new(
        source: Arc<dyn QuizDataSource>,
        host: Arc<dyn PresentationHost>,
        clock: Clock,
        timings: ControllerTimings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                host,
                clock,
                timings,
                state: Mutex::new(ControllerState::default()),
                timers: Mutex::new(TimerSet::new()),
                host_order: Mutex::new(()),
            }),
        }
    }

    /// Start the controller for `metadata`.
    ///
    /// Without metadata the controller stays idle: no fetch and no timers.
    /// Otherwise the pulse timer always starts, the polling timer starts
    /// unless `mode` is browse mode, and the first load is awaited.
    ///
    /// Activating again replaces the previous activation: its timers are
    /// stopped and its in-flight fetches are dropped when they land.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn activate(&self, metadata: Option<QuizMetadata>, mode: RunMode) -> ActivationOutcome {
        let browse_mode = mode.is_browse();
        self.timers().stop();
        {
            let mut state = self.state();
            state.browse_mode = browse_mode;
            state.active = true;
            state.metadata.clone_from(&metadata);
            state.applied_request = state.issued_requests;
        }

        let Some(metadata) = metadata else {
            info!("No quiz selected, nothing to load");
            return ActivationOutcome::Idle;
        };

        self.start_timers(&metadata, browse_mode);
        let outcome = self
            .refresh(metadata.id(), metadata.number_of_items())
            .await;
        ActivationOutcome::Loaded(outcome)
    }

    /// Stop the timers and ignore any fetch or animation still in flight.
    pub fn deactivate(&self) {
        let was_active = std::mem::replace(&mut self.state().active, false);
        self.timers().stop();
        if was_active {
            debug!("Quiz controller deactivated");
        }
    }

    /// Fetch the quiz and reconcile it with what is on screen.
    ///
    /// Failures never escape: they end up in the warning message and the log,
    /// and previously loaded items stay in place.
    pub async fn refresh(&self, quiz_id: &QuizId, expected_count: usize) -> RefreshOutcome {
        let ticket = {
            let mut state = self.state();
            if !state.active {
                return RefreshOutcome::Inactive;
            }
            state.issued_requests += 1;
            state.issued_requests
        };

        let result = self.shared.source.get_quiz(quiz_id).await;

        let _order = self.host_order();
        let mut effects = HostEffects::default();
        let outcome = self.apply_response(quiz_id, ticket, expected_count, result, &mut effects);
        self.run_effects(effects);
        outcome
    }

    /// Refresh the quiz given at activation. `None` when there is none.
    pub async fn reload(&self) -> Option<RefreshOutcome> {
        let metadata = self.state().metadata.clone()?;
        Some(
            self.refresh(metadata.id(), metadata.number_of_items())
                .await,
        )
    }

    /// Jump to `target`, clamped into `0..=item_count`, and show that item.
    pub fn go_to_page(&self, target: i64) -> Option<usize> {
        let _order = self.host_order();
        let (index, item) = {
            let mut state = self.state();
            let item = state.nav.go_to_page(target).cloned();
            (state.nav.current_index(), item)
        };
        self.shared.host.display_item(item.as_ref());
        index
    }

    pub fn go_to_previous(&self) -> Option<usize> {
        let target = self.previous_index()?;
        self.go_to_page(i64::try_from(target).unwrap_or(i64::MAX))
    }

    pub fn go_to_next(&self) -> Option<usize> {
        let target = self.next_index()?;
        self.go_to_page(i64::try_from(target).unwrap_or(i64::MAX))
    }

    /// Hand the current item to the host's answer screen.
    ///
    /// Returns the index of the answered item, `None` when no item is shown.
    pub fn show_answer(&self) -> Option<usize> {
        let _order = self.host_order();
        let (index, item) = {
            let state = self.state();
            (state.nav.current_index(), state.nav.current_item().cloned())
        };
        let item = item?;
        debug!("Showing answer for item {index:?}");
        self.shared.host.navigate_to_answer(&item);
        index
    }

    /// Play one pulse on the question, pinning the layout for its duration.
    pub async fn animate_question(&self) {
        if !self.is_active() {
            return;
        }
        let host = Arc::clone(&self.shared.host);
        let target = PulseTarget::Question;

        let hold = host.hold_layout(target);
        host.pulse(target, PulseEffect::default()).await;
        if self.is_active() {
            host.release_layout(target, hold);
        }
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.state().nav.current_index()
    }

    #[must_use]
    pub fn current_item(&self) -> Option<QuizItem> {
        self.state().nav.current_item().cloned()
    }

    #[must_use]
    pub fn previous_index(&self) -> Option<usize> {
        self.state().nav.previous_index()
    }

    #[must_use]
    pub fn next_index(&self) -> Option<usize> {
        self.state().nav.next_index()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.state().nav.len()
    }

    #[must_use]
    pub fn items(&self) -> Vec<QuizItem> {
        self.state().nav.items().to_vec()
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.state().message.clone()
    }

    #[must_use]
    pub fn browse_mode(&self) -> bool {
        self.state().browse_mode
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state().active
    }

    #[must_use]
    pub fn timer_running(&self, kind: TimerKind) -> bool {
        self.timers().is_running(kind)
    }

    fn start_timers(&self, metadata: &QuizMetadata, browse_mode: bool) {
        let timings = self.shared.timings;
        let mut timers = self.timers();

        if browse_mode {
            info!("Browse mode. Not polling server.");
        } else {
            info!(
                "Server poll interval: {} seconds",
                timings.refresh.period().as_secs()
            );
            let weak = Arc::downgrade(&self.shared);
            let metadata = metadata.clone();
            timers.start(TimerKind::Refresh, timings.refresh, move || {
                let Some(controller) = Self::upgrade(&weak) else {
                    return ControlFlow::Break(());
                };
                let metadata = metadata.clone();
                tokio::spawn(async move {
                    controller
                        .refresh(metadata.id(), metadata.number_of_items())
                        .await;
                });
                ControlFlow::Continue(())
            });
        }

        let weak = Arc::downgrade(&self.shared);
        timers.start(TimerKind::Pulse, timings.pulse, move || {
            let Some(controller) = Self::upgrade(&weak) else {
                return ControlFlow::Break(());
            };
            tokio::spawn(async move {
                controller.animate_question().await;
            });
            ControlFlow::Continue(())
        });
    }

    fn apply_response(
        &self,
        quiz_id: &QuizId,
        ticket: u64,
        expected_count: usize,
        result: Result<Vec<QuizItem>, QuizSourceError>,
        effects: &mut HostEffects,
    ) -> RefreshOutcome {
        let mut state = self.state();
        if !state.active {
            debug!("Ignoring response #{ticket} for quiz {quiz_id}: controller inactive");
            return RefreshOutcome::Inactive;
        }
        if ticket <= state.applied_request {
            debug!("Dropping stale response #{ticket} for quiz {quiz_id}");
            return RefreshOutcome::Stale;
        }
        state.applied_request = ticket;

        match result {
            Ok(items) if items.is_empty() => {
                debug!("Quiz {quiz_id} has no items yet");
                RefreshOutcome::Empty
            }
            Ok(items) => {
                let count = items.len();
                let consistent = count == expected_count;
                let message = if consistent {
                    None
                } else {
                    warn!("Quiz {quiz_id}: expected {expected_count} items, got {count}");
                    Some(ITEMS_NOT_LOADED_MESSAGE.to_string())
                };
                state.message.clone_from(&message);
                effects.warning = Some(message);

                state.nav.replace_items(items, self.shared.clock.now());
                if state.browse_mode {
                    state.nav.update_nav_indexes();
                }
                effects.display = Some(state.nav.current_item().cloned());

                RefreshOutcome::Applied { count, consistent }
            }
            Err(err) => {
                let failure = match err.kind() {
                    FailureKind::Unauthorized => {
                        effects.navigate_to_auth = true;
                        RefreshFailure::Unauthorized
                    }
                    FailureKind::Transport => RefreshFailure::TransportFailure,
                };
                error!("Error loading quiz {quiz_id}: {err}");
                state.message = Some(SERVER_UNREACHABLE_MESSAGE.to_string());
                effects.warning = Some(state.message.clone());
                RefreshOutcome::Failed(failure)
            }
        }
    }

    fn run_effects(&self, effects: HostEffects) {
        let host = &self.shared.host;
        if effects.navigate_to_auth {
            host.navigate_to_auth();
        }
        if let Some(item) = effects.display {
            host.display_item(item.as_ref());
        }
        if let Some(message) = effects.warning {
            host.show_warning(message.as_deref());
        }
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn timers(&self) -> MutexGuard<'_, TimerSet> {
        self.shared
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn host_order(&self) -> MutexGuard<'_, ()> {
        self.shared
            .host_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
