use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The complete failure taxonomy of the HTTP surface. Every handler and the
/// `AuthUser` extractor resolve their failures to one of these variants, so a
/// raw lower-layer error never reaches the client unshaped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Missing, malformed, expired or otherwise invalid credential. 401.
    #[error("{0}")]
    Unauthenticated(String),
    /// Token verified but its subject no longer exists. 404.
    #[error("{0}")]
    PrincipalNotFound(String),
    /// Resource lookup miss. 404.
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness or credential-check violation. 409.
    #[error("{0}")]
    Conflict(String),
    /// Missing or unparseable input (e.g. a required image). 400.
    #[error("{0}")]
    Validation(String),
    /// Database or media-store failure. The message shown to the client is
    /// always generic; the underlying cause is logged at the boundary. 500.
    #[error("{0}")]
    Persistence(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::PrincipalNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every error response carries the same `{"error": string}` body.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

/// Maps persistence failures at the repository boundary. Row misses become
/// `NotFound`; everything else is logged and reduced to a generic 500 so no
/// database detail leaks into the response body.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record not found".to_string()),
            other => {
                tracing::error!("database error: {:?}", other);
                ApiError::Persistence("Something went wrong".to_string())
            }
        }
    }
}
