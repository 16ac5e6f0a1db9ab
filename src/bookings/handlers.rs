// HTTP handlers for the booking endpoints. The heavy lifting lives in
// BookingService; handlers only decode, validate and encode.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::bookings::{
    BookingCreationResponse, BookingError, BookingResponse, CreateBookingRequest,
    UpdateBookingStatusRequest,
};

/// Handler for POST /api/v1/bookings
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created and confirmed", body = BookingCreationResponse),
        (status = 400, description = "Invalid request or unknown trip/boat"),
        (status = 402, description = "Payment declined"),
        (status = 404, description = "Mission not found"),
        (status = 409, description = "Insufficient seat capacity"),
        (status = 500, description = "Internal server error")
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingCreationResponse>), BookingError> {
    payload
        .validate()
        .map_err(|e| BookingError::ValidationError(e.to_string()))?;

    let response = state.booking_service.create_booking(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/v1/bookings
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses(
        (status = 200, description = "List of all bookings", body = Vec<BookingResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<BookingResponse>>, BookingError> {
    let bookings = state.booking_service.list_bookings().await?;
    tracing::debug!("Retrieved {} bookings", bookings.len());
    Ok(Json(bookings))
}

/// Handler for GET /api/v1/bookings/:id
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking found", body = BookingResponse),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state.booking_service.get_booking(id).await?;
    Ok(Json(booking))
}

/// Handler for PATCH /api/v1/bookings/:id/status
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BookingResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Booking not found")
    ),
    tag = "bookings"
)]
pub async fn update_booking_status(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingResponse>, BookingError> {
    let booking = state
        .booking_service
        .update_status(id, payload.status)
        .await?;
    Ok(Json(booking))
}
