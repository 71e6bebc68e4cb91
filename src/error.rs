// Structured failure taxonomy for the engagement ledger and admin surface.
// No public operation is allowed to panic a request; everything surfaces
// through this enum and is rendered as a JSON failure envelope.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::api::models::ApiResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: please log in")]
    Unauthorized,
    #[error("unauthorized: admin access required")]
    AdminRequired,
    #[error("authentication required")]
    AuthRequired,
    #[error("{0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::AdminRequired => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        // Internal detail stays in the logs; the client gets the reason only.
        if matches!(self, Self::Store(_) | Self::Storage(_)) {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status()).json(ApiResponse::<()>::error(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AdminRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::validation("missing title").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::NotFound("trailer".into()).status(),
            StatusCode::NOT_FOUND
        );
    }
}
