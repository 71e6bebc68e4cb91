// Postgres implementation of the engagement store.
//
// Counter updates are single atomic statements (`views + 1`,
// `GREATEST(likes + delta, 0)`) and like dedup rides on the
// (trailer_id, user_id) unique constraint, so concurrent requests can never
// drive a counter negative or double-count a like.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Db;
use crate::ledger::identity::Viewer;
use crate::store::{CommentRecord, EngagementStore, StoreError};

#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn map_insert_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl EngagementStore for PgStore {
    async fn recent_view_exists(
        &self,
        trailer_id: Uuid,
        viewer: &Viewer,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let exists: bool = match viewer {
            Viewer::User(user_id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(
                        SELECT 1 FROM views
                        WHERE trailer_id = $1 AND user_id = $2 AND created_at >= $3
                     )",
                )
                .bind(trailer_id)
                .bind(user_id)
                .bind(since)
                .fetch_one(&self.db.pool)
                .await?
            }
            Viewer::Anonymous(token) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(
                        SELECT 1 FROM views
                        WHERE trailer_id = $1 AND session_id = $2 AND created_at >= $3
                     )",
                )
                .bind(trailer_id)
                .bind(token)
                .bind(since)
                .fetch_one(&self.db.pool)
                .await?
            }
        };
        Ok(exists)
    }

    async fn insert_view(&self, trailer_id: Uuid, viewer: &Viewer) -> Result<(), StoreError> {
        let (user_id, session_id) = match viewer {
            Viewer::User(id) => (Some(*id), None),
            Viewer::Anonymous(token) => (None, Some(token.as_str())),
        };
        sqlx::query("INSERT INTO views (trailer_id, user_id, session_id) VALUES ($1, $2, $3)")
            .bind(trailer_id)
            .bind(user_id)
            .bind(session_id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn bump_views(&self, trailer_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE trailers SET views = views + 1 WHERE id = $1")
            .bind(trailer_id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn find_like(
        &self,
        trailer_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM likes WHERE trailer_id = $1 AND user_id = $2")
                .bind(trailer_id)
                .bind(user_id)
                .fetch_optional(&self.db.pool)
                .await?;
        Ok(id)
    }

    async fn insert_like(&self, trailer_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO likes (trailer_id, user_id) VALUES ($1, $2)")
            .bind(trailer_id)
            .bind(user_id)
            .execute(&self.db.pool)
            .await
            .map_err(map_insert_err)?;
        Ok(())
    }

    async fn delete_like(&self, like_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(like_id)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn bump_likes(&self, trailer_id: Uuid, delta: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE trailers SET likes = GREATEST(likes + $2, 0) WHERE id = $1")
            .bind(trailer_id)
            .bind(delta)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn insert_comment(
        &self,
        trailer_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, StoreError> {
        let comment: CommentRecord = sqlx::query_as(
            "WITH inserted AS (
                INSERT INTO comments (trailer_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, trailer_id, user_id, content, created_at
             )
             SELECT i.id, i.trailer_id, i.user_id, i.content, i.created_at,
                    p.username AS user_name
             FROM inserted i
             LEFT JOIN profiles p ON p.id = i.user_id",
        )
        .bind(trailer_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let trailer_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM comments WHERE id = $1 RETURNING trailer_id")
                .bind(comment_id)
                .fetch_optional(&self.db.pool)
                .await?;
        Ok(trailer_id)
    }

    async fn bump_comments(&self, trailer_id: Uuid, delta: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE trailers SET comments = GREATEST(comments + $2, 0) WHERE id = $1")
            .bind(trailer_id)
            .bind(delta)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn list_comments(&self, trailer_id: Uuid) -> Result<Vec<CommentRecord>, StoreError> {
        let rows: Vec<CommentRecord> = sqlx::query_as(
            "SELECT c.id, c.trailer_id, c.user_id, c.content, c.created_at,
                    p.username AS user_name
             FROM comments c
             LEFT JOIN profiles p ON p.id = c.user_id
             WHERE c.trailer_id = $1
             ORDER BY c.created_at DESC",
        )
        .bind(trailer_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_share(
        &self,
        trailer_id: Uuid,
        user_id: Option<Uuid>,
        platform: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO shares (trailer_id, user_id, platform) VALUES ($1, $2, $3)")
            .bind(trailer_id)
            .bind(user_id)
            .bind(platform)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn profile_role(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(role)
    }
}
