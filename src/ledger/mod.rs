// Engagement ledger: session-scoped view/like/comment/share accounting.
//
// All counter arithmetic is pushed down to the store (atomic increments,
// unique-constraint dedup); this layer owns the decision rules — the dedup
// window, the toggle semantics, the validation — against the narrow
// `EngagementStore` interface.

pub mod comments;
pub mod identity;
pub mod likes;
pub mod shares;
pub mod views;

use chrono::Duration;

use crate::store::EngagementStore;

pub const DEFAULT_COMMENT_MAX_LEN: usize = 2_000;

/// One-hour rolling dedup window for view counting.
pub const VIEW_DEDUP_WINDOW_SECS: i64 = 3_600;

pub struct EngagementLedger<S> {
    store: S,
    view_window: Duration,
    comment_max_len: usize,
}

impl<S: EngagementStore> EngagementLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            view_window: Duration::seconds(VIEW_DEDUP_WINDOW_SECS),
            comment_max_len: DEFAULT_COMMENT_MAX_LEN,
        }
    }

    pub fn with_comment_max_len(mut self, max: usize) -> Self {
        self.comment_max_len = max;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn view_window(&self) -> Duration {
        self.view_window
    }

    pub(crate) fn comment_max_len(&self) -> usize {
        self.comment_max_len
    }
}
