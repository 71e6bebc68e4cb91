// HTTP request handlers for API endpoints

use actix_web::{web, HttpRequest, HttpResponse};
use std::time::SystemTime;
use uuid::Uuid;

use crate::admin::require_admin;
use crate::api::auth;
use crate::api::models::*;
use crate::api::server::ApiConfig;
use crate::catalog;
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::ledger::identity::Resolution;
use crate::ledger::EngagementLedger;
use crate::mailer::{ContactMessage, Mailer, Subscription};
use crate::storage::ObjectStorage;
use crate::store::PgStore;

type Ledger = EngagementLedger<PgStore>;

/// Attach the session cookie when identity resolution minted a new token.
fn with_session_cookie(mut response: HttpResponse, resolution: &Resolution) -> HttpResponse {
    if let Some(token) = &resolution.new_token {
        if let Err(err) = response.add_cookie(&auth::new_session_cookie(token.clone())) {
            tracing::warn!(error = %err, "failed to attach session cookie");
        }
    }
    response
}

/// Public reads degrade to an empty result instead of an error page.
fn degrade<T>(result: crate::error::Result<Vec<T>>, what: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, what, "read degraded to empty result");
            Vec::new()
        }
    }
}

/// Health check endpoint
pub async fn health_check(db: web::Data<Db>) -> Result<HttpResponse> {
    let db_status = match sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(&db.pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let uptime = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: uptime,
    });

    Ok(HttpResponse::Ok().json(response))
}

// ---- Public trailer browsing ----

pub async fn list_trailers(
    query: web::Query<TrailerListQuery>,
    db: web::Data<Db>,
) -> Result<HttpResponse> {
    let (trailers, pagination) = match catalog::list_trailers(
        &db,
        query.page,
        query.per_page,
        query.category.as_deref(),
        query.search.as_deref(),
    )
    .await
    {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(error = %err, "trailer listing degraded to empty result");
            (
                Vec::new(),
                catalog::Pagination::new(0, query.page.max(1), query.per_page),
            )
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(TrailerListResponse {
        trailers,
        pagination,
    })))
}

/// Trailer detail; records an attributed view as a side effect. View
/// tracking is best-effort and never blocks the response.
pub async fn get_trailer(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let trailer_id = path.into_inner();
    let trailer = catalog::get_trailer(&db, trailer_id).await?;

    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    let view = ledger.record_view(trailer_id, &resolution.viewer).await;

    let response = HttpResponse::Ok().json(ApiResponse::success(TrailerDetailResponse {
        trailer,
        view,
    }));
    Ok(with_session_cookie(response, &resolution))
}

pub async fn featured_trailers(db: web::Data<Db>) -> Result<HttpResponse> {
    let trailers = degrade(catalog::featured_trailers(&db, 5).await, "featured");
    Ok(HttpResponse::Ok().json(ApiResponse::success(trailers)))
}

pub async fn new_releases(db: web::Data<Db>) -> Result<HttpResponse> {
    let trailers = degrade(catalog::new_releases(&db, 6).await, "new releases");
    Ok(HttpResponse::Ok().json(ApiResponse::success(trailers)))
}

pub async fn related_trailers(path: web::Path<Uuid>, db: web::Data<Db>) -> Result<HttpResponse> {
    let trailer_id = path.into_inner();
    let trailers = match catalog::get_trailer(&db, trailer_id).await {
        Ok(trailer) => degrade(
            catalog::related_trailers(&db, trailer_id, &trailer.category, 6).await,
            "related trailers",
        ),
        Err(AppError::NotFound(_)) => return Err(AppError::NotFound("trailer".into())),
        Err(err) => {
            tracing::warn!(error = %err, "related lookup degraded to empty result");
            Vec::new()
        }
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(trailers)))
}

pub async fn trending_categories(db: web::Data<Db>) -> Result<HttpResponse> {
    let categories = degrade(catalog::trending_categories(&db, 6).await, "categories");
    Ok(HttpResponse::Ok().json(ApiResponse::success(CategoriesResponse { categories })))
}

pub async fn continue_watching(
    req: HttpRequest,
    db: web::Data<Db>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    // A brand-new session has no history; skip the query entirely.
    let trailers = if resolution.new_token.is_some() {
        Vec::new()
    } else {
        degrade(
            catalog::continue_watching(&db, &resolution.viewer, 6).await,
            "continue watching",
        )
    };
    let response =
        HttpResponse::Ok().json(ApiResponse::success(ContinueWatchingResponse { trailers }));
    Ok(with_session_cookie(response, &resolution))
}

// ---- Engagement ----

pub async fn track_view(
    req: HttpRequest,
    path: web::Path<Uuid>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    let outcome = ledger
        .record_view(path.into_inner(), &resolution.viewer)
        .await;
    let response = HttpResponse::Ok().json(ApiResponse::success(outcome));
    Ok(with_session_cookie(response, &resolution))
}

pub async fn toggle_like(
    req: HttpRequest,
    path: web::Path<Uuid>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    let state = ledger
        .toggle_like(path.into_inner(), &resolution.viewer)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(state)))
}

pub async fn like_status(
    req: HttpRequest,
    path: web::Path<Uuid>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    let state = ledger
        .liked_status(path.into_inner(), &resolution.viewer)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(state)))
}

pub async fn list_comments(
    path: web::Path<Uuid>,
    ledger: web::Data<Ledger>,
) -> Result<HttpResponse> {
    let comments = degrade(ledger.comments(path.into_inner()).await, "comments");
    Ok(HttpResponse::Ok().json(ApiResponse::success(CommentsResponse { comments })))
}

pub async fn add_comment(
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    let comment = ledger
        .add_comment(path.into_inner(), &resolution.viewer, &payload.content)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(comment)))
}

pub async fn share_trailer(
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: web::Json<ShareRequest>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let resolution = auth::resolve_viewer(&req, &config.jwt_secret);
    ledger
        .record_share(path.into_inner(), &resolution.viewer, &payload.platform)
        .await?;
    let response = HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "shared": true
    })));
    Ok(with_session_cookie(response, &resolution))
}

// ---- Contact & newsletter ----

pub async fn contact(
    payload: web::Json<ContactMessage>,
    mailer: web::Data<Mailer>,
) -> Result<HttpResponse> {
    mailer.send_contact(&payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "sent": true
    }))))
}

pub async fn subscribe(
    payload: web::Json<Subscription>,
    mailer: web::Data<Mailer>,
) -> Result<HttpResponse> {
    mailer.send_subscription(&payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "subscribed": true
    }))))
}

// ---- Ads (public lookup) ----

pub async fn active_ad(
    query: web::Query<ActiveAdQuery>,
    db: web::Data<Db>,
) -> Result<HttpResponse> {
    let ad = match catalog::active_ad(&db, &query.placement).await {
        Ok(ad) => ad,
        Err(err) => {
            tracing::warn!(error = %err, "active-ad lookup degraded to empty result");
            None
        }
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(ActiveAdResponse { ad })))
}

// ---- Admin: trailers ----

async fn admin_user(
    req: &HttpRequest,
    ledger: &Ledger,
    config: &ApiConfig,
) -> Result<Uuid> {
    let user = auth::authenticated_user(req, &config.jwt_secret);
    require_admin(ledger.store(), user).await
}

pub async fn create_trailer(
    req: HttpRequest,
    payload: web::Json<catalog::TrailerInput>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let admin = admin_user(&req, &ledger, &config).await?;
    let trailer = catalog::create_trailer(&db, &payload).await?;
    tracing::info!(admin = %admin, trailer = %trailer.id, title = %trailer.title, "trailer created");
    Ok(HttpResponse::Created().json(ApiResponse::success(trailer)))
}

pub async fn update_trailer(
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: web::Json<catalog::TrailerInput>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    let trailer = catalog::update_trailer(&db, path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(trailer)))
}

pub async fn delete_trailer(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    let admin = admin_user(&req, &ledger, &config).await?;
    let trailer_id = path.into_inner();
    catalog::delete_trailer(&db, trailer_id).await?;
    tracing::info!(admin = %admin, trailer = %trailer_id, "trailer deleted");
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "deleted": true
    }))))
}

pub async fn delete_comment(
    req: HttpRequest,
    path: web::Path<Uuid>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    ledger.delete_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "deleted": true
    }))))
}

// ---- Admin: ads ----

pub async fn list_ads(
    req: HttpRequest,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    let ads = catalog::list_ads(&db).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ads)))
}

pub async fn create_ad(
    req: HttpRequest,
    payload: web::Json<catalog::AdInput>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    let ad = catalog::create_ad(&db, &payload).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(ad)))
}

pub async fn update_ad(
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: web::Json<catalog::AdInput>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    let ad = catalog::update_ad(&db, path.into_inner(), &payload).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ad)))
}

pub async fn delete_ad(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<Db>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    catalog::delete_ad(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "deleted": true
    }))))
}

// ---- Admin: media upload ----

pub async fn upload_media(
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
    storage: web::Data<ObjectStorage>,
    ledger: web::Data<Ledger>,
    config: web::Data<ApiConfig>,
) -> Result<HttpResponse> {
    admin_user(&req, &ledger, &config).await?;
    if body.is_empty() {
        return Err(AppError::validation("upload body is empty"));
    }
    let url = storage
        .upload(&query.path, body.to_vec(), &query.content_type)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(UploadResponse { url })))
}
