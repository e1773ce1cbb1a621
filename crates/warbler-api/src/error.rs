use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;
use uuid::Uuid;

use warbler_db::StoreError;

/// Failures a handler can end with. Each maps to one response shape.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// User-correctable input problem; the message is shown as-is.
    #[error("{0}")]
    Validation(String),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already taken")]
    EmailTaken,

    #[error("not found")]
    NotFound,

    /// No usable session. Rendered as a redirect to the landing page.
    #[error("access unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken => Self::UsernameTaken,
            StoreError::EmailTaken => Self::EmailTaken,
            StoreError::NotFound => Self::NotFound,
            other => Self::Internal(other.into()),
        }
    }
}

impl AppError {
    /// Errors a form page re-renders inline instead of failing the request.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UsernameTaken | Self::EmailTaken)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::UsernameTaken | Self::EmailTaken => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Self::Unauthorized => found("/"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Access unauthorized").into_response(),
            Self::Internal(err) => {
                error!("internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// 302 redirect to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Parse an id taken from the URL. A malformed id names nothing, so it is
/// a 404 like any other unknown id.
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("not-a-uuid"), Err(AppError::NotFound)));
        assert!(matches!(parse_id(""), Err(AppError::NotFound)));
    }
}
