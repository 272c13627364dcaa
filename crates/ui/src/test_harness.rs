use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::Clock;
use quiz_core::model::{QuizId, QuizItem, QuizMetadata};
use quiz_core::time::{fixed_now, fixed_offset};
use services::{QuizDataSource, QuizSourceError, RunMode};

use crate::context::{AppContext, QuizApp, build_app_context};
use crate::host::{LayoutHold, PresentationHost, PulseEffect, PulseTarget};
use crate::timers::ControllerTimings;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Display(Option<String>),
    Warning(Option<String>),
    Hold(PulseTarget),
    Pulse(PulseTarget),
    Release(PulseTarget),
    NavigateToAuth,
    Answer(String),
}

#[derive(Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
    animation: Duration,
}

impl RecordingHost {
    pub fn with_animation(animation: Duration) -> Self {
        Self {
            events: Mutex::default(),
            animation,
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: &HostEvent) -> usize {
        self.events().iter().filter(|event| *event == wanted).count()
    }

    pub fn pulses(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, HostEvent::Pulse(_)))
            .count()
    }

    pub fn last_display(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|event| match event {
            HostEvent::Display(question) => Some(question),
            _ => None,
        })
    }

    pub fn last_warning(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|event| match event {
            HostEvent::Warning(message) => Some(message),
            _ => None,
        })
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl PresentationHost for RecordingHost {
    fn display_item(&self, item: Option<&QuizItem>) {
        self.record(HostEvent::Display(item.map(|i| i.question().to_string())));
    }

    fn show_warning(&self, message: Option<&str>) {
        self.record(HostEvent::Warning(message.map(str::to_string)));
    }

    fn hold_layout(&self, target: PulseTarget) -> LayoutHold {
        self.record(HostEvent::Hold(target));
        LayoutHold {
            pinned_height: Some(120),
            previous_height: None,
        }
    }

    async fn pulse(&self, target: PulseTarget, _effect: PulseEffect) {
        self.record(HostEvent::Pulse(target));
        if !self.animation.is_zero() {
            tokio::time::sleep(self.animation).await;
        }
    }

    fn release_layout(&self, target: PulseTarget, hold: LayoutHold) {
        assert_eq!(hold.pinned_height, Some(120));
        self.record(HostEvent::Release(target));
    }

    fn navigate_to_auth(&self) {
        self.record(HostEvent::NavigateToAuth);
    }

    fn navigate_to_answer(&self, item: &QuizItem) {
        self.record(HostEvent::Answer(item.question().to_string()));
    }
}

#[derive(Clone, Debug)]
pub enum Reply {
    Items(Vec<QuizItem>),
    Unauthorized,
    Offline,
}

/// Data source answering from a queue of scripted replies, each after a delay.
/// The last reply repeats once the queue runs dry.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<(Duration, Reply)>>,
    last: Mutex<Option<(Duration, Reply)>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let source = Self::default();
        for reply in replies {
            source.push(Duration::ZERO, reply);
        }
        source
    }

    pub fn push(&self, delay: Duration, reply: Reply) {
        self.replies.lock().unwrap().push_back((delay, reply));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Quiz ids in the order they were fetched.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn next_reply(&self) -> (Duration, Reply) {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        last.clone()
            .unwrap_or((Duration::ZERO, Reply::Items(Vec::new())))
    }
}

#[async_trait]
impl QuizDataSource for ScriptedSource {
    async fn get_quiz(&self, id: &QuizId) -> Result<Vec<QuizItem>, QuizSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(id.to_string());
        let (delay, reply) = self.next_reply();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Items(items) => Ok(items),
            Reply::Unauthorized => Err(QuizSourceError::Unauthorized),
            Reply::Offline => Err(QuizSourceError::Unavailable("connection refused".into())),
        }
    }
}

/// Items named `Q0`, `Q1`, ... starting at the given offsets from `fixed_now()`.
pub fn items_at(offsets: &[i64]) -> Vec<QuizItem> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, secs)| QuizItem::new(fixed_offset(*secs), format!("Q{i}")))
        .collect()
}

pub fn metadata(expected: usize) -> QuizMetadata {
    QuizMetadata::new(QuizId::new("coffee").unwrap(), expected)
}

struct TestApp {
    metadata: Option<QuizMetadata>,
    mode: RunMode,
    start_item: Option<i64>,
    source: Arc<ScriptedSource>,
}

impl QuizApp for TestApp {
    fn quiz_metadata(&self) -> Option<QuizMetadata> {
        self.metadata.clone()
    }

    fn run_mode(&self) -> RunMode {
        self.mode
    }

    fn start_item(&self) -> Option<i64> {
        self.start_item
    }

    fn data_source(&self) -> Arc<dyn QuizDataSource> {
        self.source.clone()
    }

    fn timings(&self) -> ControllerTimings {
        ControllerTimings::default()
    }

    fn clock(&self) -> Clock {
        Clock::fixed(fixed_now())
    }
}

pub struct Harness {
    pub context: AppContext,
    pub host: Arc<RecordingHost>,
    pub source: Arc<ScriptedSource>,
}

pub fn setup_harness(
    metadata: Option<QuizMetadata>,
    mode: RunMode,
    source: ScriptedSource,
    host: RecordingHost,
) -> Harness {
    setup_deep_link_harness(metadata, mode, None, source, host)
}

pub fn setup_deep_link_harness(
    metadata: Option<QuizMetadata>,
    mode: RunMode,
    start_item: Option<i64>,
    source: ScriptedSource,
    host: RecordingHost,
) -> Harness {
    let source = Arc::new(source);
    let app: Arc<dyn QuizApp> = Arc::new(TestApp {
        metadata,
        mode,
        start_item,
        source: Arc::clone(&source),
    });
    Harness {
        context: build_app_context(&app),
        host: Arc::new(host),
        source,
    }
}
