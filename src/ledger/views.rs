// View deduplication and counting.
//
// Per (trailer, viewer) pair: no recent view -> record + count once, then
// suppress until the rolling window elapses. The window is evaluated at
// call time, not against a calendar boundary. View tracking is best-effort:
// a store failure is logged and reported as `Skipped`, never raised, so
// page rendering proceeds regardless.

use chrono::Utc;
use uuid::Uuid;

use crate::ledger::identity::Viewer;
use crate::ledger::EngagementLedger;
use crate::store::EngagementStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewOutcome {
    /// A new view row was stored and the counter incremented.
    Counted,
    /// A view from this viewer exists within the dedup window; nothing stored.
    AlreadyCounted,
    /// The store was unavailable; the view was dropped.
    Skipped,
}

impl<S: EngagementStore> EngagementLedger<S> {
    pub async fn record_view(&self, trailer_id: Uuid, viewer: &Viewer) -> ViewOutcome {
        let since = Utc::now() - self.view_window();

        let recent = match self
            .store()
            .recent_view_exists(trailer_id, viewer, since)
            .await
        {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(%trailer_id, error = %err, "view dedup lookup failed, dropping view");
                return ViewOutcome::Skipped;
            }
        };

        if recent {
            return ViewOutcome::AlreadyCounted;
        }

        if let Err(err) = self.store().insert_view(trailer_id, viewer).await {
            tracing::warn!(%trailer_id, error = %err, "view insert failed, dropping view");
            return ViewOutcome::Skipped;
        }

        // Store-side atomic increment; a failure here leaves the counter one
        // behind the row count until the next accepted view, which the
        // eventual-consistency contract tolerates.
        if let Err(err) = self.store().bump_views(trailer_id).await {
            tracing::warn!(%trailer_id, error = %err, "view counter bump failed");
            return ViewOutcome::Skipped;
        }

        ViewOutcome::Counted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::identity;
    use crate::store::memory::MemStore;
    use chrono::Duration;

    fn ledger() -> EngagementLedger<MemStore> {
        EngagementLedger::new(MemStore::default())
    }

    #[tokio::test]
    async fn first_view_is_counted_once() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::Anonymous("session-a".into());

        assert_eq!(ledger.record_view(trailer, &viewer).await, ViewOutcome::Counted);
        assert_eq!(ledger.store().views_counter(trailer), 1);
    }

    #[tokio::test]
    async fn second_view_within_window_is_suppressed() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::Anonymous("session-a".into());

        ledger.record_view(trailer, &viewer).await;
        assert_eq!(
            ledger.record_view(trailer, &viewer).await,
            ViewOutcome::AlreadyCounted
        );
        assert_eq!(ledger.store().views_counter(trailer), 1);
        assert_eq!(ledger.store().view_rows(trailer), 1);
    }

    #[tokio::test]
    async fn view_outside_window_counts_again() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::Anonymous("session-a".into());

        ledger.record_view(trailer, &viewer).await;
        // Age the stored view past the one-hour window.
        ledger
            .store()
            .age_views(trailer, Duration::seconds(3_601));

        assert_eq!(ledger.record_view(trailer, &viewer).await, ViewOutcome::Counted);
        assert_eq!(ledger.store().views_counter(trailer), 2);
    }

    #[tokio::test]
    async fn distinct_viewers_count_separately() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();

        ledger
            .record_view(trailer, &Viewer::Anonymous("a".into()))
            .await;
        ledger
            .record_view(trailer, &Viewer::User(uuid::Uuid::new_v4()))
            .await;

        assert_eq!(ledger.store().views_counter(trailer), 2);
    }

    #[tokio::test]
    async fn fresh_anonymous_session_gets_counted() {
        // First-contact scenario: no cookie yet, resolver mints a token and
        // the view still lands exactly once.
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();

        let resolution = identity::resolve(None, None);
        assert!(resolution.new_token.is_some());
        assert_eq!(
            ledger.record_view(trailer, &resolution.viewer).await,
            ViewOutcome::Counted
        );
        assert_eq!(ledger.store().views_counter(trailer), 1);
    }

    #[tokio::test]
    async fn store_failure_is_swallowed() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        ledger.store().fail_next();

        assert_eq!(
            ledger
                .record_view(trailer, &Viewer::Anonymous("a".into()))
                .await,
            ViewOutcome::Skipped
        );
        assert_eq!(ledger.store().views_counter(trailer), 0);
    }
}
