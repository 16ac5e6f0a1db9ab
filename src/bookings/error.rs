use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Error types for booking operations.
///
/// Every error raised before the allocator commits causes a full
/// transaction rollback; nothing partial ever persists.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Booking not found")]
    NotFound,

    #[error("Mission {0} not found")]
    MissionNotFound(Uuid),

    /// The mission record exists but its configuration is missing or the
    /// mission is not open for sales. Distinct from `MissionNotFound`.
    #[error("Mission not available for booking: {0}")]
    MissionInvalid(String),

    #[error("Trip {0} not found")]
    TripNotFound(Uuid),

    #[error("Boat {0} not found")]
    BoatNotFound(Uuid),

    /// A database record is missing a config identifier the pricing lookup
    /// needs. Operator-facing internal fault, not a user input error.
    #[error("Configuration inconsistency: {0}")]
    ConfigurationInconsistent(String),

    #[error("Price for {item_type} on trip {trip_id} not configured")]
    PriceNotConfigured { item_type: String, trip_id: Uuid },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Booking must contain at least one item")]
    EmptyBooking,

    #[error("Not enough capacity on boat {boat} for trip {trip}")]
    InsufficientCapacity { boat: String, trip: String },

    /// Postgres aborted this transaction in favor of a concurrent one
    /// (deadlock or serialization failure). Nothing was persisted; the
    /// request is safe to retry as-is.
    #[error("Booking conflicted with concurrent activity; please retry")]
    TransactionConflict,

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        // SQLSTATE 40001 (serialization_failure) and 40P01 (deadlock
        // detected): the transaction was rolled back to let a concurrent
        // one proceed. Retryable, not an internal fault.
        if let Some(code) = err.as_database_error().and_then(|db| db.code()) {
            if code == "40001" || code == "40P01" {
                return BookingError::TransactionConflict;
            }
        }
        BookingError::DatabaseError(err.to_string())
    }
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::DatabaseError(_) | BookingError::ConfigurationInconsistent(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BookingError::NotFound | BookingError::MissionNotFound(_) => StatusCode::NOT_FOUND,
            BookingError::MissionInvalid(_)
            | BookingError::TripNotFound(_)
            | BookingError::BoatNotFound(_)
            | BookingError::PriceNotConfigured { .. }
            | BookingError::InvalidQuantity(_)
            | BookingError::EmptyBooking
            | BookingError::InvalidTransition(_)
            | BookingError::ValidationError(_) => StatusCode::BAD_REQUEST,
            BookingError::InsufficientCapacity { .. } | BookingError::TransactionConflict => {
                StatusCode::CONFLICT
            }
            BookingError::PaymentDeclined(_) => StatusCode::PAYMENT_REQUIRED,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            BookingError::DatabaseError(msg) => tracing::error!("Database error: {}", msg),
            BookingError::ConfigurationInconsistent(msg) => {
                // Internal fault; should alert operators.
                tracing::error!("Configuration inconsistency: {}", msg)
            }
            BookingError::InsufficientCapacity { boat, trip } => {
                tracing::warn!("Capacity conflict on boat {} for trip {}", boat, trip)
            }
            BookingError::TransactionConflict => {
                tracing::warn!("Transaction aborted by concurrent activity; client may retry")
            }
            BookingError::PaymentDeclined(reason) => {
                tracing::warn!("Payment declined: {}", reason)
            }
            other => tracing::debug!("Booking request rejected: {}", other),
        }

        // Internal faults get a generic client message; everything else is
        // safe to relay.
        let message = match &self {
            BookingError::DatabaseError(_) => "A database error occurred".to_string(),
            BookingError::ConfigurationInconsistent(_) => {
                "An internal configuration error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        let id = Uuid::new_v4();
        assert_eq!(
            BookingError::MissionNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BookingError::MissionInvalid("inactive".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BookingError::TripNotFound(id).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BookingError::InsufficientCapacity {
                boat: "endeavour".into(),
                trip: "lv-morning".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BookingError::PaymentDeclined("card expired".into()).status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            BookingError::TransactionConflict.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BookingError::ConfigurationInconsistent("missing config id".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BookingError::EmptyBooking.status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
