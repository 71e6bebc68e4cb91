// Comment submission and retrieval.
//
// Append-only from the public surface; deletion exists for the admin
// surface and keeps the denormalized counter in step with the same clamp
// the like path uses.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::ledger::identity::Viewer;
use crate::ledger::EngagementLedger;
use crate::store::{CommentRecord, EngagementStore};

impl<S: EngagementStore> EngagementLedger<S> {
    /// Append a comment and bump the trailer's comment counter by one.
    /// Content must be non-empty after trimming and within the length cap.
    pub async fn add_comment(
        &self,
        trailer_id: Uuid,
        viewer: &Viewer,
        content: &str,
    ) -> Result<CommentRecord> {
        let user_id = viewer.user_id().ok_or(AppError::AuthRequired)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("comment content is required"));
        }
        if content.chars().count() > self.comment_max_len() {
            return Err(AppError::Validation(format!(
                "comment exceeds maximum length of {} characters",
                self.comment_max_len()
            )));
        }

        let comment = self
            .store()
            .insert_comment(trailer_id, user_id, content)
            .await?;
        self.store().bump_comments(trailer_id, 1).await?;
        Ok(comment)
    }

    /// Comments for a trailer, newest first.
    pub async fn comments(&self, trailer_id: Uuid) -> Result<Vec<CommentRecord>> {
        Ok(self.store().list_comments(trailer_id).await?)
    }

    /// Remove a comment and decrement the counter (clamped at zero).
    pub async fn delete_comment(&self, comment_id: Uuid) -> Result<()> {
        match self.store().delete_comment(comment_id).await? {
            Some(trailer_id) => {
                self.store().bump_comments(trailer_id, -1).await?;
                Ok(())
            }
            None => Err(AppError::NotFound("comment".into())),
        }
    }
}
