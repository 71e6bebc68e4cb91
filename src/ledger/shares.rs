// Share recording: any viewer, best-effort, no counter on the trailer row.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::ledger::identity::Viewer;
use crate::ledger::EngagementLedger;
use crate::store::EngagementStore;

impl<S: EngagementStore> EngagementLedger<S> {
    pub async fn record_share(
        &self,
        trailer_id: Uuid,
        viewer: &Viewer,
        platform: &str,
    ) -> Result<()> {
        let platform = platform.trim();
        if platform.is_empty() {
            return Err(AppError::validation("share platform is required"));
        }
        self.store()
            .insert_share(trailer_id, viewer.user_id(), platform)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;

    #[tokio::test]
    async fn anonymous_share_carries_no_user() {
        let ledger = EngagementLedger::new(MemStore::default());
        let trailer = ledger.store().add_trailer();

        ledger
            .record_share(trailer, &Viewer::Anonymous("sess".into()), "whatsapp")
            .await
            .unwrap();
        let user = Uuid::new_v4();
        ledger
            .record_share(trailer, &Viewer::User(user), "x")
            .await
            .unwrap();

        let shares = ledger.store().share_rows(trailer);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0], (None, "whatsapp".to_string()));
        assert_eq!(shares[1], (Some(user), "x".to_string()));
    }

    #[tokio::test]
    async fn blank_platform_is_rejected() {
        let ledger = EngagementLedger::new(MemStore::default());
        let trailer = ledger.store().add_trailer();
        let err = ledger
            .record_share(trailer, &Viewer::Anonymous("sess".into()), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
