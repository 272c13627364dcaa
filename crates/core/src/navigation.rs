//! Position tracking over an ordered list of quiz items.

use chrono::{DateTime, Utc};

use crate::model::QuizItem;

/// Index of the item that is "current" at `now`.
///
/// Returns the greatest index whose `start_time` is at or before `now`, or 0
/// when every item lies in the future (or the list is empty). Items must be
/// sorted by ascending `start_time`; unsorted input yields an unspecified
/// index but never panics.
#[must_use]
pub fn find_item_index_by_date(items: &[QuizItem], now: DateTime<Utc>) -> usize {
    let insertion = items.partition_point(|item| item.start_time() <= now);
    insertion.saturating_sub(1)
}

/// Loaded items plus the current position and the derived prev/next pointers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    items: Vec<QuizItem>,
    current_index: Option<usize>,
    previous_index: Option<usize>,
    next_index: Option<usize>,
}

impl NavigationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly fetched list and locate the current item by date.
    ///
    /// The prev/next pointers are left alone; callers decide whether to
    /// recompute them with [`NavigationState::update_nav_indexes`].
    pub fn replace_items(&mut self, items: Vec<QuizItem>, now: DateTime<Utc>) -> Option<usize> {
        self.current_index = if items.is_empty() {
            None
        } else {
            Some(find_item_index_by_date(&items, now))
        };
        self.items = items;
        self.current_index
    }

    pub fn update_nav_indexes(&mut self) {
        match self.current_index {
            Some(current) => {
                self.previous_index = current.checked_sub(1);
                self.next_index = (current + 1 < self.items.len()).then_some(current + 1);
            }
            None => {
                self.previous_index = None;
                self.next_index = None;
            }
        }
    }

    /// Jump to `target`, clamped into `0..=len`.
    ///
    /// The upper bound is the list length itself, so the resulting index may
    /// point one past the last item; in that case no item is returned.
    pub fn go_to_page(&mut self, target: i64) -> Option<&QuizItem> {
        let len = self.items.len();
        let clamped = if target <= 0 {
            0
        } else {
            usize::try_from(target).map_or(len, |t| t.min(len))
        };
        self.current_index = Some(clamped);
        self.update_nav_indexes();
        self.items.get(clamped)
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&QuizItem> {
        self.current_index.and_then(|i| self.items.get(i))
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn previous_index(&self) -> Option<usize> {
        self.previous_index
    }

    #[must_use]
    pub fn next_index(&self) -> Option<usize> {
        self.next_index
    }

    #[must_use]
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
