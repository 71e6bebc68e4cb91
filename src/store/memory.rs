// In-memory EngagementStore used by the ledger unit tests. Mirrors the
// Postgres behavior that matters to the ledger: the (trailer, user) unique
// constraint on likes and the zero-clamped counter bumps.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::ledger::identity::Viewer;
use crate::store::{CommentRecord, EngagementStore, StoreError};

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    views: i64,
    likes: i64,
    comments: i64,
}

#[derive(Debug, Clone)]
struct ViewRow {
    trailer_id: Uuid,
    user_id: Option<Uuid>,
    session_id: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct LikeRow {
    id: Uuid,
    trailer_id: Uuid,
    user_id: Uuid,
}

#[derive(Default)]
struct Inner {
    trailers: HashMap<Uuid, Counters>,
    views: Vec<ViewRow>,
    likes: Vec<LikeRow>,
    comments: Vec<CommentRecord>,
    shares: Vec<(Uuid, Option<Uuid>, String)>,
    profiles: HashMap<Uuid, String>,
    fail_next: bool,
    conflict_next_like: bool,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn add_trailer(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner
            .lock()
            .unwrap()
            .trailers
            .insert(id, Counters::default());
        id
    }

    pub fn set_role(&self, user_id: Uuid, role: &str) {
        self.inner
            .lock()
            .unwrap()
            .profiles
            .insert(user_id, role.to_string());
    }

    /// Fail the next store call with a database error.
    pub fn fail_next(&self) {
        self.inner.lock().unwrap().fail_next = true;
    }

    /// Report a unique-constraint conflict on the next like insert.
    pub fn conflict_on_next_like_insert(&self) {
        self.inner.lock().unwrap().conflict_next_like = true;
    }

    /// Shift every stored view for a trailer into the past.
    pub fn age_views(&self, trailer_id: Uuid, by: Duration) {
        let mut inner = self.inner.lock().unwrap();
        for row in inner.views.iter_mut().filter(|v| v.trailer_id == trailer_id) {
            row.created_at -= by;
        }
    }

    pub fn views_counter(&self, trailer_id: Uuid) -> i64 {
        self.counters(trailer_id).views
    }

    pub fn likes_counter(&self, trailer_id: Uuid) -> i64 {
        self.counters(trailer_id).likes
    }

    pub fn comments_counter(&self, trailer_id: Uuid) -> i64 {
        self.counters(trailer_id).comments
    }

    pub fn view_rows(&self, trailer_id: Uuid) -> usize {
        self.inner
            .lock()
            .unwrap()
            .views
            .iter()
            .filter(|v| v.trailer_id == trailer_id)
            .count()
    }

    pub fn like_rows(&self, trailer_id: Uuid) -> usize {
        self.inner
            .lock()
            .unwrap()
            .likes
            .iter()
            .filter(|l| l.trailer_id == trailer_id)
            .count()
    }

    pub fn share_rows(&self, trailer_id: Uuid) -> Vec<(Option<Uuid>, String)> {
        self.inner
            .lock()
            .unwrap()
            .shares
            .iter()
            .filter(|(t, _, _)| *t == trailer_id)
            .map(|(_, u, p)| (*u, p.clone()))
            .collect()
    }

    fn counters(&self, trailer_id: Uuid) -> Counters {
        self.inner
            .lock()
            .unwrap()
            .trailers
            .get(&trailer_id)
            .copied()
            .unwrap_or_default()
    }

    fn check_fail(inner: &mut Inner) -> Result<(), StoreError> {
        if inner.fail_next {
            inner.fail_next = false;
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn viewer_matches(row: &ViewRow, viewer: &Viewer) -> bool {
    match viewer {
        Viewer::User(id) => row.user_id == Some(*id),
        Viewer::Anonymous(token) => row.session_id.as_deref() == Some(token.as_str()),
    }
}

#[async_trait]
impl EngagementStore for MemStore {
    async fn recent_view_exists(
        &self,
        trailer_id: Uuid,
        viewer: &Viewer,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        Ok(inner.views.iter().any(|v| {
            v.trailer_id == trailer_id && viewer_matches(v, viewer) && v.created_at >= since
        }))
    }

    async fn insert_view(&self, trailer_id: Uuid, viewer: &Viewer) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        let (user_id, session_id) = match viewer {
            Viewer::User(id) => (Some(*id), None),
            Viewer::Anonymous(token) => (None, Some(token.clone())),
        };
        inner.views.push(ViewRow {
            trailer_id,
            user_id,
            session_id,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn bump_views(&self, trailer_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        inner.trailers.entry(trailer_id).or_default().views += 1;
        Ok(())
    }

    async fn find_like(
        &self,
        trailer_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        Ok(inner
            .likes
            .iter()
            .find(|l| l.trailer_id == trailer_id && l.user_id == user_id)
            .map(|l| l.id))
    }

    async fn insert_like(&self, trailer_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        if inner.conflict_next_like {
            inner.conflict_next_like = false;
            return Err(StoreError::Conflict);
        }
        if inner
            .likes
            .iter()
            .any(|l| l.trailer_id == trailer_id && l.user_id == user_id)
        {
            return Err(StoreError::Conflict);
        }
        inner.likes.push(LikeRow {
            id: Uuid::new_v4(),
            trailer_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_like(&self, like_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        inner.likes.retain(|l| l.id != like_id);
        Ok(())
    }

    async fn bump_likes(&self, trailer_id: Uuid, delta: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        let counters = inner.trailers.entry(trailer_id).or_default();
        counters.likes = (counters.likes + delta).max(0);
        Ok(())
    }

    async fn insert_comment(
        &self,
        trailer_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            trailer_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
            user_name: inner.profiles.get(&user_id).cloned(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        let trailer_id = inner
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| c.trailer_id);
        inner.comments.retain(|c| c.id != comment_id);
        Ok(trailer_id)
    }

    async fn bump_comments(&self, trailer_id: Uuid, delta: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        let counters = inner.trailers.entry(trailer_id).or_default();
        counters.comments = (counters.comments + delta).max(0);
        Ok(())
    }

    async fn list_comments(&self, trailer_id: Uuid) -> Result<Vec<CommentRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        let mut rows: Vec<CommentRecord> = inner
            .comments
            .iter()
            .filter(|c| c.trailer_id == trailer_id)
            .cloned()
            .collect();
        rows.reverse(); // insertion order -> newest first
        Ok(rows)
    }

    async fn insert_share(
        &self,
        trailer_id: Uuid,
        user_id: Option<Uuid>,
        platform: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        inner.shares.push((trailer_id, user_id, platform.to_string()));
        Ok(())
    }

    async fn profile_role(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_fail(&mut inner)?;
        Ok(inner.profiles.get(&user_id).cloned())
    }
}
