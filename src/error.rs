// Error handling for the record-management API surface.
// Booking allocation has its own richer error type in bookings::error;
// this one covers the thin CRUD endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Error type for the record-management handlers.
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation.
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Resource not found by ID.
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict.
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Database operation errors.
    /// Maps to HTTP 500 Internal Server Error; details stay server-side
    DatabaseError(sqlx::Error),

    /// Internal server errors.
    /// Maps to HTTP 500 Internal Server Error; details stay server-side
    InternalError(String),
}

/// Consistent error response structure shared by all endpoints.
/// Machine-readable `error_code` plus a human-readable `message`.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    /// Optional additional details (e.g. field-level validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert to an HTTP status and client-facing body, logging at a
    /// level matching severity. Database and internal details are never
    /// echoed to the client.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "VALIDATION_ERROR".to_string(),
                        message: "Request validation failed".to_string(),
                        details: Some(
                            serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                        ),
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error_code: "NOT_FOUND".to_string(),
                        message: format!("{} with id {} not found", resource, id),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        error_code: "CONFLICT".to_string(),
                        message: message.clone(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "DATABASE_ERROR".to_string(),
                        message: "A database error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred".to_string(),
                        details: None,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(
            ApiError::NotFound {
                resource: "Mission".to_string(),
                id: "abc".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict {
                message: "duplicate".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::InternalError("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_resource_and_id() {
        let err = ApiError::NotFound {
            resource: "Boat".to_string(),
            id: "42".to_string(),
        };
        let (status, body) = err.to_error_response();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error_code, "NOT_FOUND");
        assert_eq!(body.message, "Boat with id 42 not found");
    }
}
