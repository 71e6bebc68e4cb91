// Like toggle: row existence is the liked state.
//
// Authenticated viewers only. The store enforces a unique constraint on
// (trailer, user); an insert conflict means a concurrent double-submit
// already landed the like, which we report as `liked = true` rather than
// an error. Decrements are clamped at zero store-side.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::ledger::identity::Viewer;
use crate::ledger::EngagementLedger;
use crate::store::{EngagementStore, StoreError};

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LikeState {
    pub liked: bool,
}

impl<S: EngagementStore> EngagementLedger<S> {
    /// Flip the viewer's liked state. Two consecutive toggles return to the
    /// original state and counter value.
    pub async fn toggle_like(&self, trailer_id: Uuid, viewer: &Viewer) -> Result<LikeState> {
        let user_id = viewer.user_id().ok_or(AppError::AuthRequired)?;

        if let Some(like_id) = self.store().find_like(trailer_id, user_id).await? {
            self.store().delete_like(like_id).await?;
            self.store().bump_likes(trailer_id, -1).await?;
            return Ok(LikeState { liked: false });
        }

        match self.store().insert_like(trailer_id, user_id).await {
            Ok(()) => {
                self.store().bump_likes(trailer_id, 1).await?;
                Ok(LikeState { liked: true })
            }
            // Lost the race against our own double-submit: the row exists,
            // so the state is simply "liked".
            Err(StoreError::Conflict) => Ok(LikeState { liked: true }),
            Err(err) => Err(err.into()),
        }
    }

    /// Current liked state; anonymous viewers are never "liked".
    pub async fn liked_status(&self, trailer_id: Uuid, viewer: &Viewer) -> Result<LikeState> {
        let Some(user_id) = viewer.user_id() else {
            return Ok(LikeState { liked: false });
        };
        let liked = self.store().find_like(trailer_id, user_id).await?.is_some();
        Ok(LikeState { liked })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;

    fn ledger() -> EngagementLedger<MemStore> {
        EngagementLedger::new(MemStore::default())
    }

    #[tokio::test]
    async fn like_unlike_like_cycles_counter() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::User(Uuid::new_v4());

        let state = ledger.toggle_like(trailer, &viewer).await.unwrap();
        assert!(state.liked);
        assert_eq!(ledger.store().likes_counter(trailer), 1);

        let state = ledger.toggle_like(trailer, &viewer).await.unwrap();
        assert!(!state.liked);
        assert_eq!(ledger.store().likes_counter(trailer), 0);

        let state = ledger.toggle_like(trailer, &viewer).await.unwrap();
        assert!(state.liked);
        assert_eq!(ledger.store().likes_counter(trailer), 1);
    }

    #[tokio::test]
    async fn double_toggle_restores_counter() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::User(Uuid::new_v4());

        ledger.toggle_like(trailer, &viewer).await.unwrap();
        let state = ledger.toggle_like(trailer, &viewer).await.unwrap();
        assert!(!state.liked);
        assert_eq!(ledger.store().likes_counter(trailer), 0);
        assert_eq!(ledger.store().like_rows(trailer), 0);
    }

    #[tokio::test]
    async fn counter_never_goes_negative() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();

        // Decrement with no prior like rows must clamp at zero.
        ledger.store().bump_likes(trailer, -1).await.unwrap();
        assert_eq!(ledger.store().likes_counter(trailer), 0);

        let viewer = Viewer::User(Uuid::new_v4());
        ledger.toggle_like(trailer, &viewer).await.unwrap();
        ledger.toggle_like(trailer, &viewer).await.unwrap();
        ledger.toggle_like(trailer, &viewer).await.unwrap();
        ledger.toggle_like(trailer, &viewer).await.unwrap();
        assert_eq!(ledger.store().likes_counter(trailer), 0);
    }

    #[tokio::test]
    async fn anonymous_viewer_is_rejected() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::Anonymous("sess".into());

        let err = ledger.toggle_like(trailer, &viewer).await.unwrap_err();
        assert!(matches!(err, AppError::AuthRequired));
        assert_eq!(ledger.store().likes_counter(trailer), 0);
    }

    #[tokio::test]
    async fn insert_conflict_reads_as_already_liked() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let user = Uuid::new_v4();

        // Simulate the race: the row lands between the existence check and
        // the insert.
        ledger.store().conflict_on_next_like_insert();
        let state = ledger
            .toggle_like(trailer, &Viewer::User(user))
            .await
            .unwrap();
        assert!(state.liked);
    }

    #[tokio::test]
    async fn liked_status_tracks_toggle() {
        let ledger = ledger();
        let trailer = ledger.store().add_trailer();
        let viewer = Viewer::User(Uuid::new_v4());

        assert!(!ledger.liked_status(trailer, &viewer).await.unwrap().liked);
        ledger.toggle_like(trailer, &viewer).await.unwrap();
        assert!(ledger.liked_status(trailer, &viewer).await.unwrap().liked);

        let anon = Viewer::Anonymous("sess".into());
        assert!(!ledger.liked_status(trailer, &anon).await.unwrap().liked);
    }
}
