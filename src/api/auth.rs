// Request-boundary identity resolution.
//
// The authenticated branch is a bearer JWT (HS256, `sub` = user UUID) from
// the auth provider; the anonymous branch is the session cookie. This is
// the only place that reads transport-level identity; handlers receive a
// resolved `Viewer` and the ledger never sees a request.

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    HttpRequest,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::ledger::identity::{self, Resolution};

pub const SESSION_COOKIE: &str = "tucheki_session";

const SESSION_COOKIE_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Decode the authenticated user id from the Authorization header, if any.
/// Invalid or expired tokens resolve to anonymous rather than failing the
/// request; protected routes fail later at the admin gate.
pub fn authenticated_user(req: &HttpRequest, jwt_secret: &str) -> Option<Uuid> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))?;

    let mut validation = Validation::new(Algorithm::HS256);
    // Supabase-style access tokens carry an `aud` we don't dispatch on.
    validation.validate_aud = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .ok()?;
    Uuid::parse_str(&data.claims.sub).ok()
}

pub fn session_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Resolve the viewer for this request: authenticated user first, then the
/// session cookie, else a freshly minted anonymous token.
pub fn resolve_viewer(req: &HttpRequest, jwt_secret: &str) -> Resolution {
    let user = authenticated_user(req, jwt_secret);
    let cookie = session_cookie(req);
    identity::resolve(user, cookie.as_deref())
}

/// Session cookie for a newly minted anonymous token: 30-day expiry,
/// site-wide path.
pub fn new_session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .max_age(CookieDuration::days(SESSION_COOKIE_DAYS))
        .same_site(SameSite::Lax)
        .http_only(true)
        .finish()
}
