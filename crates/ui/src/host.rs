use async_trait::async_trait;
use quiz_core::model::QuizItem;

/// Element of the question screen that can be emphasised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulseTarget {
    Question,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PulseKind {
    #[default]
    RubberBand,
}

/// Options passed to the host's animation engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PulseEffect {
    pub kind: PulseKind,
    /// Fail the animation future if it gets interrupted.
    pub reject_on_interrupt: bool,
    /// Animate in a fixed-position overlay instead of in place.
    pub fixed: bool,
}

/// Layout the host pinned before an animation, handed back afterwards so it
/// can be restored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutHold {
    pub pinned_height: Option<u32>,
    pub previous_height: Option<String>,
}

/// Everything the navigation controller needs from the screen hosting it.
///
/// `display_item`, `show_warning`, `navigate_to_auth` and `navigate_to_answer`
/// are called while the controller orders host updates; they must not call
/// back into its refresh or navigation methods.
#[async_trait]
pub trait PresentationHost: Send + Sync {
    /// Render `item` as the current question. `None` clears the question area.
    fn display_item(&self, item: Option<&QuizItem>);

    /// Set (`Some`) or clear (`None`) the warning banner.
    fn show_warning(&self, message: Option<&str>);

    /// Pin the layout around `target` so the animation does not shift siblings.
    fn hold_layout(&self, _target: PulseTarget) -> LayoutHold {
        LayoutHold::default()
    }

    /// Play `effect` on `target`, resolving when the animation is over.
    async fn pulse(&self, target: PulseTarget, effect: PulseEffect);

    fn release_layout(&self, _target: PulseTarget, _hold: LayoutHold) {}

    /// Leave the quiz and show the login flow.
    fn navigate_to_auth(&self);

    /// Open the answer screen for `item`.
    fn navigate_to_answer(&self, item: &QuizItem);
}
