// Persistence seam for the engagement ledger.
//
// The ledger only ever sees this narrow interface: row-level reads/writes
// plus atomic counter bumps. Counter arithmetic and like-dedup live on the
// store side (SQL increments, unique constraints), never as read-modify-write
// in the caller.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::identity::Viewer;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique-constraint violation. The like toggle treats this as
    /// "already liked" rather than an error.
    #[error("conflict: row already exists")]
    Conflict,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for crate::error::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => {
                crate::error::AppError::Validation("conflicting row already exists".into())
            }
            StoreError::Database(e) => crate::error::AppError::Store(e),
        }
    }
}

/// A stored comment joined with its author's profile username.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub trailer_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
}

#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Does a view row exist for this (trailer, viewer) at or after `since`?
    async fn recent_view_exists(
        &self,
        trailer_id: Uuid,
        viewer: &Viewer,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn insert_view(&self, trailer_id: Uuid, viewer: &Viewer) -> Result<(), StoreError>;

    /// Atomic `views = views + 1`.
    async fn bump_views(&self, trailer_id: Uuid) -> Result<(), StoreError>;

    async fn find_like(&self, trailer_id: Uuid, user_id: Uuid)
        -> Result<Option<Uuid>, StoreError>;

    /// Insert a like row. Returns `Err(StoreError::Conflict)` when the
    /// (trailer, user) unique constraint already holds a row.
    async fn insert_like(&self, trailer_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;

    async fn delete_like(&self, like_id: Uuid) -> Result<(), StoreError>;

    /// Atomic `likes = likes + delta`, clamped at zero.
    async fn bump_likes(&self, trailer_id: Uuid, delta: i64) -> Result<(), StoreError>;

    async fn insert_comment(
        &self,
        trailer_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, StoreError>;

    /// Delete a comment, returning the trailer it belonged to (None if the
    /// row was already gone).
    async fn delete_comment(&self, comment_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// Atomic `comments = comments + delta`, clamped at zero.
    async fn bump_comments(&self, trailer_id: Uuid, delta: i64) -> Result<(), StoreError>;

    /// Comments for a trailer, newest first.
    async fn list_comments(&self, trailer_id: Uuid) -> Result<Vec<CommentRecord>, StoreError>;

    async fn insert_share(
        &self,
        trailer_id: Uuid,
        user_id: Option<Uuid>,
        platform: &str,
    ) -> Result<(), StoreError>;

    /// Role attribute from the profiles table, None when no profile exists.
    async fn profile_role(&self, user_id: Uuid) -> Result<Option<String>, StoreError>;
}
