//! # Error Handling
//!
//! This module provides unified error handling for the Orgstore API: a small
//! domain taxonomy shared by the directory, the collection store, and the
//! lifecycle orchestrator, mapped onto the uniform HTTP response envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Domain error taxonomy for organization lifecycle operations.
///
/// Variants map one-to-one to HTTP status codes at the request boundary.
/// Storage and internal errors are logged with full detail and surfaced to
/// the caller as a generic message, never the underlying error text.
#[derive(Debug, Error)]
pub enum OrgError {
    /// Missing or malformed input (400).
    #[error("{0}")]
    Validation(String),
    /// Uniqueness violation on organization name or admin email (409).
    #[error("{0}")]
    Duplicate(String),
    /// No such organization or collection (404).
    #[error("{0}")]
    NotFound(String),
    /// Missing/invalid/expired token or claim mismatch (401).
    #[error("{0}")]
    Unauthorized(String),
    /// Storage-layer failure, propagated unchanged from the driver (500).
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
    /// Anything unexpected caught at the request boundary (500).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl OrgError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn duplicate<S: Into<String>>(message: S) -> Self {
        Self::Duplicate(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized(message.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrgError::Validation(_) => StatusCode::BAD_REQUEST,
            OrgError::Duplicate(_) => StatusCode::CONFLICT,
            OrgError::NotFound(_) => StatusCode::NOT_FOUND,
            OrgError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            OrgError::Storage(_) | OrgError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts a database error into `Duplicate` when it is a unique-key
    /// violation, otherwise propagates it as a storage error.
    pub fn from_db(error: sea_orm::DbErr, duplicate_message: &str) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "unique constraint violation detected");
            Self::Duplicate(duplicate_message.to_string())
        } else {
            Self::Storage(error)
        }
    }
}

fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const MYSQL_DUPLICATE_CODES: &[&str] = &["1022", "1062", "1169", "1586"];
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    let runtime_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    if let Some(code) = db_error.code() {
        let code_str = code.as_ref();
        return code_str == PG_UNIQUE
            || MYSQL_DUPLICATE_CODES.contains(&code_str)
            || SQLITE_DUPLICATE_CODES.contains(&code_str);
    }

    false
}

impl IntoResponse for OrgError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            OrgError::Storage(error) => {
                tracing::error!(?error, "storage error");
                "Internal server error".to_string()
            }
            OrgError::Internal(error) => {
                tracing::error!(?error, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
