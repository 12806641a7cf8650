//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for every lookup, update or delete that targets a missing key.
pub const STUDENT_NOT_FOUND: &str = "Student not found";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key} '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("password hashing: {0}")]
    Password(String),
}

impl AppError {
    pub fn student_not_found() -> Self {
        AppError::NotFound(STUDENT_NOT_FOUND.to_string())
    }

    pub fn duplicate_student(matric_number: &str) -> Self {
        AppError::Conflict(format!("Student '{}' already exists", matric_number))
    }

    /// An explicit null reached a column that does not accept one.
    pub fn null_column(column: &str) -> Self {
        AppError::Validation(format!("{} may not be null", column))
    }

    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            AppError::Password(_) => (StatusCode::INTERNAL_SERVER_ERROR, "password_error"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                AppError::PayloadTooLarge(other.body_text())
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_is_fixed() {
        let err = AppError::student_not_found();
        assert_eq!(err.to_string(), "Student not found");
        assert_eq!(err.status(), (StatusCode::NOT_FOUND, "not_found"));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::duplicate_student("a").status().0, StatusCode::CONFLICT);
        assert_eq!(AppError::BadRequest("x".into()).status().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Db(sqlx::Error::RowNotFound).status().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Db(sqlx::Error::PoolTimedOut).status().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn null_column_is_a_validation_error() {
        let err = AppError::null_column("first_name");
        assert_eq!(err.to_string(), "validation: first_name may not be null");
        assert_eq!(err.status().1, "validation_error");
    }
}
