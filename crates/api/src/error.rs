use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tagalong_core::error::LobbyError;
use tagalong_db::error::RepoError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`LobbyError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the lobby engine.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller did not present a valid identity token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Lobby(e) => AppError::Lobby(e),
            RepoError::Db(e) => AppError::Database(e),
            e @ RepoError::ShareCodeExhausted { .. } => AppError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- LobbyError variants ---
            AppError::Lobby(lobby) => classify_lobby_error(lobby),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map each lobby guard violation to an HTTP status and stable error code.
fn classify_lobby_error(err: &LobbyError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        LobbyError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
        LobbyError::InvalidConfiguration(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_CONFIGURATION", message)
        }
        LobbyError::LobbyClosed { .. } => (StatusCode::CONFLICT, "LOBBY_CLOSED", message),
        LobbyError::LobbyFull { .. } => (StatusCode::CONFLICT, "LOBBY_FULL", message),
        LobbyError::AlreadyMember => (StatusCode::CONFLICT, "ALREADY_MEMBER", message),
        LobbyError::NotAMember => (StatusCode::NOT_FOUND, "NOT_A_MEMBER", message),
        LobbyError::CreatorCannotLeave => {
            (StatusCode::FORBIDDEN, "CREATOR_CANNOT_LEAVE", message)
        }
        LobbyError::RoleConflict(_) => (StatusCode::CONFLICT, "ROLE_CONFLICT", message),
        LobbyError::NotAuthorizedForTransition(_) => {
            (StatusCode::FORBIDDEN, "NOT_AUTHORIZED", message)
        }
        LobbyError::InvalidTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_TRANSITION", message)
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
