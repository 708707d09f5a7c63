//! Error types for survey operations.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::validate::{FieldError, FieldErrorKind, SubmissionRejection};

/// Errors that can occur while reading or writing the survey store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The database could not be reached or the pool is exhausted or closed.
    Unavailable(String),
    /// A schema constraint (unique, foreign key, check) rejected a write.
    Constraint(String),
    /// Any other storage failure.
    Internal(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Database unavailable: {}", msg),
            Self::Constraint(msg) => write!(f, "Constraint violation: {}", msg),
            Self::Internal(msg) => write!(f, "Internal storage error: {}", msg),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StorageError::Unavailable(e.to_string())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StorageError::Unavailable(e.to_string()),
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                StorageError::Constraint(db_err.message().to_string())
            }
            _ => StorageError::Internal(e.to_string()),
        }
    }
}

impl std::error::Error for StorageError {}

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    pub status: String,
    /// Human-readable summary without internal detail.
    pub message: String,
    /// Field-level detail for rejected submissions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorEnvelope {
    /// Creates an envelope with no field detail.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be read as JSON.
    Malformed {
        /// Status chosen by the JSON extractor (400, 413, 415, ...).
        status: StatusCode,
        /// Extractor message.
        detail: String,
    },
    /// The payload parsed but failed validation.
    Rejected(SubmissionRejection),
    /// The store failed; details are logged, never returned.
    Storage(StorageError),
    /// A readiness probe could not reach the database.
    Unavailable,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<SubmissionRejection> for ApiError {
    fn from(rejection: SubmissionRejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            ApiError::Malformed { status, detail } => (
                status,
                ErrorEnvelope {
                    errors: vec![FieldError::new("$", FieldErrorKind::Malformed, detail)],
                    ..ErrorEnvelope::new("request body is not a valid JSON submission")
                },
            ),
            ApiError::Rejected(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorEnvelope {
                    errors: rejection.into_errors(),
                    ..ErrorEnvelope::new("submission failed validation")
                },
            ),
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorEnvelope::new("failed to store survey data"),
            ),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorEnvelope::new("database unreachable"),
            ),
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_unavailable() {
        let e = StorageError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(e, StorageError::Unavailable(_)));
    }

    #[test]
    fn row_not_found_is_internal() {
        let e = StorageError::from(sqlx::Error::RowNotFound);
        assert!(matches!(e, StorageError::Internal(_)));
    }

    #[test]
    fn storage_error_response_hides_detail() {
        let response = ApiError::Storage(StorageError::Unavailable(
            "connection to postgres://admin:hunter2@db failed".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn envelope_omits_empty_errors() {
        let json = serde_json::to_value(ErrorEnvelope::new("nope")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "nope");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn rejection_maps_to_unprocessable_entity() {
        let rejection = SubmissionRejection::single(FieldError::new(
            "q1_eligible",
            FieldErrorKind::Missing,
            "field is required",
        ));
        let response = ApiError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
