use std::sync::Arc;

use log::debug;

use quiz_core::Clock;
use quiz_core::model::QuizMetadata;
use services::{QuizDataSource, RunMode};

use crate::host::PresentationHost;
use crate::timers::ControllerTimings;
use crate::vm::{ActivationOutcome, QuizNavigationController, RefreshOutcome};

/// What the composition root (e.g. `crates/app`) hands to the UI layer.
pub trait QuizApp: Send + Sync {
    /// Quiz to open, if the user picked one.
    fn quiz_metadata(&self) -> Option<QuizMetadata>;
    fn run_mode(&self) -> RunMode;

    /// Item to open instead of the one current by date (a deep link).
    fn start_item(&self) -> Option<i64> {
        None
    }

    fn data_source(&self) -> Arc<dyn QuizDataSource>;

    fn timings(&self) -> ControllerTimings {
        ControllerTimings::default()
    }

    fn clock(&self) -> Clock {
        Clock::system()
    }
}

#[derive(Clone)]
pub struct AppContext {
    quiz_metadata: Option<QuizMetadata>,
    run_mode: RunMode,
    start_item: Option<i64>,
    timings: ControllerTimings,
    clock: Clock,

    data_source: Arc<dyn QuizDataSource>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn QuizApp>) -> Self {
        Self {
            quiz_metadata: app.quiz_metadata(),
            run_mode: app.run_mode(),
            start_item: app.start_item(),
            timings: app.timings(),
            clock: app.clock(),
            data_source: app.data_source(),
        }
    }

    #[must_use]
    pub fn quiz_metadata(&self) -> Option<&QuizMetadata> {
        self.quiz_metadata.as_ref()
    }

    #[must_use]
    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    #[must_use]
    pub fn data_source(&self) -> Arc<dyn QuizDataSource> {
        Arc::clone(&self.data_source)
    }

    #[must_use]
    pub fn controller(&self, host: Arc<dyn PresentationHost>) -> QuizNavigationController {
        QuizNavigationController::new(self.data_source(), host, self.clock, self.timings)
    }

    /// Build a controller for `host` and activate it with the configured quiz.
    ///
    /// A configured start item is applied once the first load put items on
    /// screen; until then there is nothing to jump to.
    pub async fn launch(
        &self,
        host: Arc<dyn PresentationHost>,
    ) -> (QuizNavigationController, ActivationOutcome) {
        let controller = self.controller(host);
        let outcome = controller
            .activate(self.quiz_metadata.clone(), self.run_mode)
            .await;
        if let (Some(target), ActivationOutcome::Loaded(RefreshOutcome::Applied { .. })) =
            (self.start_item, outcome)
        {
            debug!("Opening start item {target}");
            controller.go_to_page(target);
        }
        (controller, outcome)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn QuizApp>) -> AppContext {
    AppContext::new(app)
}
