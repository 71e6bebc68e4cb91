// Admin authorization gate.
//
// Every mutating trailer/ad/upload operation runs this check before
// touching the store. The role is loaded fresh on every call so a role
// revoked mid-session takes effect on the next request.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::store::EngagementStore;

pub const ADMIN_ROLE: &str = "admin";

/// Require an authenticated session whose profile carries the admin role.
/// Returns the admin's user id on success.
pub async fn require_admin<S: EngagementStore>(store: &S, user: Option<Uuid>) -> Result<Uuid> {
    let user_id = user.ok_or(AppError::Unauthorized)?;
    match store.profile_role(user_id).await? {
        Some(role) if role == ADMIN_ROLE => Ok(user_id),
        _ => Err(AppError::AdminRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let store = MemStore::default();
        let err = require_admin(&store, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn non_admin_role_is_rejected() {
        let store = MemStore::default();
        let user = Uuid::new_v4();
        store.set_role(user, "editor");
        let err = require_admin(&store, Some(user)).await.unwrap_err();
        assert!(matches!(err, AppError::AdminRequired));
    }

    #[tokio::test]
    async fn missing_profile_is_rejected() {
        let store = MemStore::default();
        let err = require_admin(&store, Some(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AdminRequired));
    }

    #[tokio::test]
    async fn admin_role_passes() {
        let store = MemStore::default();
        let user = Uuid::new_v4();
        store.set_role(user, ADMIN_ROLE);
        assert_eq!(require_admin(&store, Some(user)).await.unwrap(), user);
    }
}
