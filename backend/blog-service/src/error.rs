/// Error types for Blog Service
///
/// Every failure a handler can produce is an [`AppError`]. Errors render as
/// `{"error": ..., "status": ..., "redirect"?: ...}`; `redirect` tells the
/// front end where to send the user (sign-in for anonymous callers, home for
/// missing posts and denied admin access).
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Where anonymous callers are sent unless `SIGN_IN_PATH` overrides it
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth";

/// Where callers land after a missing post or a denied admin view
pub const HOME_PATH: &str = "/";

const UNIQUE_VIOLATION: &str = "23505";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input shape rejected before any backend call
    #[error("{0}")]
    Validation(String),

    /// Malformed request (bad multipart, unparsable id)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No usable session; the caller is sent to `sign_in_path`
    #[error("{message}")]
    Unauthorized {
        message: String,
        sign_in_path: String,
    },

    /// Caller lacks ownership or the admin role
    #[error("{message}")]
    Forbidden {
        message: String,
        redirect: Option<&'static str>,
    },

    /// Requested post or tag does not exist
    #[error("{0}")]
    NotFound(String),

    /// Unique constraint hit (duplicate slug)
    #[error("{0}")]
    Conflict(String),

    /// Backend request failed
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage request failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'a str>,
}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
            redirect: None,
        }
    }

    pub fn admin_required() -> Self {
        AppError::Forbidden {
            message: "You don't have admin privileges".to_string(),
            redirect: Some(HOME_PATH),
        }
    }

    pub fn unauthorized(message: impl Into<String>, sign_in_path: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
            sign_in_path: sign_in_path.into(),
        }
    }

    pub fn sign_in_required(sign_in_path: &str) -> Self {
        Self::unauthorized("Sign in required", sign_in_path)
    }

    /// Where the front end should navigate after this error, if anywhere
    pub fn redirect(&self) -> Option<&str> {
        match self {
            AppError::Unauthorized { sign_in_path, .. } => Some(sign_in_path.as_str()),
            AppError::NotFound(_) => Some(HOME_PATH),
            AppError::Forbidden { redirect, .. } => *redirect,
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
            redirect: self.redirect(),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return AppError::Conflict(format!(
                    "A record with the same slug already exists ({})",
                    db_err.message()
                ));
            }
        }
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
