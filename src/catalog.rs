// Trailer and advertisement catalog: browse queries and the admin-gated
// CRUD surface. Typed records are the single conversion seam over the
// store; handlers never see raw rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::ledger::identity::Viewer;

pub const DEFAULT_PAGE_SIZE: i64 = 12;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Trailer {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub director: Option<String>,
    #[serde(rename = "cast")]
    pub cast_list: Option<String>,
    pub duration: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub featured: bool,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrailerInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub director: Option<String>,
    #[serde(rename = "cast")]
    pub cast_list: Option<String>,
    pub duration: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub featured: bool,
}

impl TrailerInput {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.category.trim().is_empty()
            || self.video_url.trim().is_empty()
        {
            return Err(AppError::validation(
                "title, description, category, and video URL are required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub placement: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdInput {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub placement: String,
    #[serde(default)]
    pub active: bool,
}

impl AdInput {
    fn validate(&self) -> Result<()> {
        let required = [
            &self.title,
            &self.description,
            &self.image_url,
            &self.link_url,
            &self.placement,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::validation("all ad fields are required"));
        }
        if self.end_date < self.start_date {
            return Err(AppError::validation("ad end date precedes start date"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WatchedTrailer {
    pub id: Uuid,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub category: String,
    pub last_watched: DateTime<Utc>,
}

const TRAILER_COLUMNS: &str = "id, title, description, category, video_url, thumbnail_url, \
     director, cast_list, duration, release_date, featured, views, likes, comments, created_at";

/// Paginated trailer listing, newest release first, with optional category
/// and case-insensitive title/description search filters.
pub async fn list_trailers(
    db: &Db,
    page: i64,
    per_page: i64,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<(Vec<Trailer>, Pagination)> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;
    let pattern = search.map(|s| format!("%{}%", s.trim()));

    let mut count_qb: QueryBuilder<'_, sqlx::Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM trailers WHERE TRUE");
    if let Some(cat) = category {
        count_qb.push(" AND category = ").push_bind(cat);
    }
    if let Some(ref pat) = pattern {
        count_qb
            .push(" AND (title ILIKE ")
            .push_bind(pat.as_str())
            .push(" OR description ILIKE ")
            .push_bind(pat.as_str())
            .push(")");
    }
    let total: i64 = count_qb.build_query_scalar().fetch_one(&db.pool).await?;

    let mut qb: QueryBuilder<'_, sqlx::Postgres> =
        QueryBuilder::new(format!("SELECT {TRAILER_COLUMNS} FROM trailers WHERE TRUE"));
    if let Some(cat) = category {
        qb.push(" AND category = ").push_bind(cat);
    }
    if let Some(ref pat) = pattern {
        qb.push(" AND (title ILIKE ")
            .push_bind(pat.as_str())
            .push(" OR description ILIKE ")
            .push_bind(pat.as_str())
            .push(")");
    }
    qb.push(" ORDER BY release_date DESC NULLS LAST, created_at DESC")
        .push(" LIMIT ")
        .push_bind(per_page)
        .push(" OFFSET ")
        .push_bind(offset);

    let trailers: Vec<Trailer> = qb.build_query_as().fetch_all(&db.pool).await?;
    Ok((trailers, Pagination::new(total, page, per_page)))
}

pub async fn get_trailer(db: &Db, id: Uuid) -> Result<Trailer> {
    let trailer: Option<Trailer> =
        sqlx::query_as(&format!("SELECT {TRAILER_COLUMNS} FROM trailers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&db.pool)
            .await?;
    trailer.ok_or_else(|| AppError::NotFound("trailer".into()))
}

pub async fn featured_trailers(db: &Db, limit: i64) -> Result<Vec<Trailer>> {
    let rows = sqlx::query_as(&format!(
        "SELECT {TRAILER_COLUMNS} FROM trailers WHERE featured ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(&db.pool)
    .await?;
    Ok(rows)
}

pub async fn new_releases(db: &Db, limit: i64) -> Result<Vec<Trailer>> {
    let rows = sqlx::query_as(&format!(
        "SELECT {TRAILER_COLUMNS} FROM trailers \
         ORDER BY release_date DESC NULLS LAST, created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(&db.pool)
    .await?;
    Ok(rows)
}

/// Trailers sharing a category with the given one, excluding it.
pub async fn related_trailers(
    db: &Db,
    trailer_id: Uuid,
    category: &str,
    limit: i64,
) -> Result<Vec<Trailer>> {
    let rows = sqlx::query_as(&format!(
        "SELECT {TRAILER_COLUMNS} FROM trailers \
         WHERE category = $1 AND id <> $2 \
         ORDER BY views DESC LIMIT $3"
    ))
    .bind(category)
    .bind(trailer_id)
    .bind(limit)
    .fetch_all(&db.pool)
    .await?;
    Ok(rows)
}

/// Categories ranked by trailer count.
pub async fn trending_categories(db: &Db, limit: i64) -> Result<Vec<CategoryCount>> {
    let rows = sqlx::query_as(
        "SELECT category, COUNT(*) AS count FROM trailers \
         GROUP BY category ORDER BY count DESC, category LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&db.pool)
    .await?;
    Ok(rows)
}

/// The viewer's most recently watched distinct trailers.
pub async fn continue_watching(db: &Db, viewer: &Viewer, limit: i64) -> Result<Vec<WatchedTrailer>> {
    let base = "SELECT id, title, thumbnail_url, duration, category, last_watched FROM (
            SELECT DISTINCT ON (v.trailer_id)
                   t.id, t.title, t.thumbnail_url, t.duration, t.category,
                   v.created_at AS last_watched
            FROM views v
            JOIN trailers t ON t.id = v.trailer_id
            WHERE {ident}
            ORDER BY v.trailer_id, v.created_at DESC
         ) w ORDER BY last_watched DESC LIMIT $2";

    let rows = match viewer {
        Viewer::User(user_id) => {
            sqlx::query_as(&base.replace("{ident}", "v.user_id = $1"))
                .bind(user_id)
                .bind(limit)
                .fetch_all(&db.pool)
                .await?
        }
        Viewer::Anonymous(token) => {
            sqlx::query_as(&base.replace("{ident}", "v.session_id = $1"))
                .bind(token)
                .bind(limit)
                .fetch_all(&db.pool)
                .await?
        }
    };
    Ok(rows)
}

/// Insert a trailer with zeroed engagement counters.
pub async fn create_trailer(db: &Db, input: &TrailerInput) -> Result<Trailer> {
    input.validate()?;
    let trailer: Trailer = sqlx::query_as(&format!(
        "INSERT INTO trailers \
           (title, description, category, video_url, thumbnail_url, director, \
            cast_list, duration, release_date, featured, views, likes, comments) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, 0, 0) \
         RETURNING {TRAILER_COLUMNS}"
    ))
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.video_url)
    .bind(&input.thumbnail_url)
    .bind(&input.director)
    .bind(&input.cast_list)
    .bind(&input.duration)
    .bind(input.release_date)
    .bind(input.featured)
    .fetch_one(&db.pool)
    .await?;
    Ok(trailer)
}

/// Update a trailer's metadata. Engagement counters are never touched here.
pub async fn update_trailer(db: &Db, id: Uuid, input: &TrailerInput) -> Result<Trailer> {
    input.validate()?;
    let trailer: Option<Trailer> = sqlx::query_as(&format!(
        "UPDATE trailers SET \
           title = $2, description = $3, category = $4, video_url = $5, \
           thumbnail_url = $6, director = $7, cast_list = $8, duration = $9, \
           release_date = $10, featured = $11 \
         WHERE id = $1 \
         RETURNING {TRAILER_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.category)
    .bind(&input.video_url)
    .bind(&input.thumbnail_url)
    .bind(&input.director)
    .bind(&input.cast_list)
    .bind(&input.duration)
    .bind(input.release_date)
    .bind(input.featured)
    .fetch_optional(&db.pool)
    .await?;
    trailer.ok_or_else(|| AppError::NotFound("trailer".into()))
}

/// Delete a trailer and its child engagement rows. Children go first so a
/// partial failure never strands orphaned rows behind a missing parent.
pub async fn delete_trailer(db: &Db, id: Uuid) -> Result<()> {
    let mut tx = db.pool.begin().await?;
    for table in ["comments", "likes", "views", "shares"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE trailer_id = $1"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    let deleted = sqlx::query("DELETE FROM trailers WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("trailer".into()));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn list_ads(db: &Db) -> Result<Vec<Ad>> {
    let rows = sqlx::query_as("SELECT * FROM ads ORDER BY created_at DESC")
        .fetch_all(&db.pool)
        .await?;
    Ok(rows)
}

pub async fn create_ad(db: &Db, input: &AdInput) -> Result<Ad> {
    input.validate()?;
    let ad: Ad = sqlx::query_as(
        "INSERT INTO ads \
           (title, description, image_url, link_url, start_date, end_date, placement, active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(&input.link_url)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.placement)
    .bind(input.active)
    .fetch_one(&db.pool)
    .await?;
    Ok(ad)
}

pub async fn update_ad(db: &Db, id: Uuid, input: &AdInput) -> Result<Ad> {
    input.validate()?;
    let ad: Option<Ad> = sqlx::query_as(
        "UPDATE ads SET \
           title = $2, description = $3, image_url = $4, link_url = $5, \
           start_date = $6, end_date = $7, placement = $8, active = $9 \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(&input.link_url)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.placement)
    .bind(input.active)
    .fetch_optional(&db.pool)
    .await?;
    ad.ok_or_else(|| AppError::NotFound("ad".into()))
}

pub async fn delete_ad(db: &Db, id: Uuid) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM ads WHERE id = $1")
        .bind(id)
        .execute(&db.pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("ad".into()));
    }
    Ok(())
}

/// The newest active ad for a placement slot, if any is in its window.
pub async fn active_ad(db: &Db, placement: &str) -> Result<Option<Ad>> {
    let now = Utc::now();
    let ad = sqlx::query_as(
        "SELECT * FROM ads \
         WHERE placement = $1 AND active AND start_date <= $2 AND end_date >= $2 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(placement)
    .bind(now)
    .fetch_optional(&db.pool)
    .await?;
    Ok(ad)
}
