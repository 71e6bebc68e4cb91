// Session identity resolution.
//
// A request is attributed to exactly one identity: the authenticated user
// when present, otherwise the anonymous session token from the cookie,
// otherwise a freshly minted token. The HTTP boundary resolves this once
// per request and hands the `Viewer` into every ledger operation, so the
// ledger itself never touches cookies or auth headers.

use uuid::Uuid;

/// One attributed identity per request. Authenticated identity always wins
/// over the anonymous session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    User(Uuid),
    Anonymous(String),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::User(id) => Some(*id),
            Viewer::Anonymous(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::User(_))
    }
}

/// Outcome of identity resolution. `new_token` is set only on the
/// "no prior identity" path; the caller must persist it as a cookie
/// (30-day expiry, path `/`).
#[derive(Debug, Clone)]
pub struct Resolution {
    pub viewer: Viewer,
    pub new_token: Option<String>,
}

/// Resolve the viewer for the current request. Never fails: worst case is a
/// fresh anonymous identity.
pub fn resolve(user: Option<Uuid>, session_cookie: Option<&str>) -> Resolution {
    if let Some(id) = user {
        return Resolution {
            viewer: Viewer::User(id),
            new_token: None,
        };
    }
    match session_cookie {
        Some(token) if !token.is_empty() => Resolution {
            viewer: Viewer::Anonymous(token.to_string()),
            new_token: None,
        },
        _ => {
            let token = Uuid::new_v4().to_string();
            Resolution {
                viewer: Viewer::Anonymous(token.clone()),
                new_token: Some(token),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_user_takes_precedence_over_cookie() {
        let id = Uuid::new_v4();
        let res = resolve(Some(id), Some("stale-token"));
        assert_eq!(res.viewer, Viewer::User(id));
        assert!(res.new_token.is_none());
    }

    #[test]
    fn existing_cookie_is_returned_unchanged() {
        let res = resolve(None, Some("abc-123"));
        assert_eq!(res.viewer, Viewer::Anonymous("abc-123".into()));
        assert!(res.new_token.is_none());
    }

    #[test]
    fn missing_identity_mints_a_fresh_token() {
        let res = resolve(None, None);
        let token = match &res.viewer {
            Viewer::Anonymous(t) => t.clone(),
            other => panic!("expected anonymous viewer, got {other:?}"),
        };
        assert_eq!(res.new_token.as_deref(), Some(token.as_str()));
        // Canonical token format is a UUID v4 string.
        assert!(Uuid::parse_str(&token).is_ok());
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let res = resolve(None, Some(""));
        assert!(res.new_token.is_some());
    }
}
