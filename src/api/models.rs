// API request/response models (DTOs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Ad, CategoryCount, Pagination, Trailer, WatchedTrailer};
use crate::ledger::views::ViewOutcome;
use crate::store::CommentRecord;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Some(Meta::now()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            meta: Some(Meta::now()),
        }
    }
}

/// Metadata included in all API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

/// Trailer listing query parameters
#[derive(Debug, Deserialize)]
pub struct TrailerListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    pub category: Option<String>,
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    crate::catalog::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize)]
pub struct TrailerListResponse {
    pub trailers: Vec<Trailer>,
    pub pagination: Pagination,
}

/// Trailer detail plus the view-tracking outcome for this request.
#[derive(Debug, Serialize)]
pub struct TrailerDetailResponse {
    pub trailer: Trailer,
    pub view: ViewOutcome,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
pub struct ContinueWatchingResponse {
    pub trailers: Vec<WatchedTrailer>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub platform: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveAdQuery {
    pub placement: String,
}

#[derive(Debug, Serialize)]
pub struct ActiveAdResponse {
    pub ad: Option<Ad>,
}

/// Upload parameters; the file body rides as the raw request body.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Object key within the media bucket, e.g. "thumbnails/safari.jpg".
    pub path: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}
