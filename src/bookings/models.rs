use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a booking. Created as `PendingPayment`; `Completed`,
/// `Cancelled` and `Refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
    Refunded,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Refunded => "refunded",
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::PendingPayment
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of one line within a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Active,
    Refunded,
    Fulfilled,
}

/// What a booking line sells. Only the two ticket types occupy seats and
/// count against boat capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    AdultTicket,
    ChildTicket,
    Merchandise,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::AdultTicket => "adult_ticket",
            ItemType::ChildTicket => "child_ticket",
            ItemType::Merchandise => "merchandise",
        }
    }

    /// Whether this item occupies a passenger seat.
    pub fn is_seat(&self) -> bool {
        matches!(self, ItemType::AdultTicket | ItemType::ChildTicket)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a settled monetary transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Refunded,
    PartiallyRefunded,
}

/// The booking aggregate root, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub confirmation_code: String,
    pub mission_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub billing_address: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_reference: Option<String>,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub launch_updates_preference: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One priced line within a booking. The unit price is captured at booking
/// time and never re-derived from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingItem {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub boat_id: Option<Uuid>,
    pub item_type: ItemType,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A settled monetary transaction against a booking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub payment_reference: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for one booking line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookingItemRequest {
    pub trip_id: Uuid,
    /// Required for seat items; ignored for merchandise.
    pub boat_id: Option<Uuid>,
    pub item_type: ItemType,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for creating a booking.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub mission_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub user_name: String,
    #[validate(email)]
    pub user_email: String,
    #[validate(length(min = 5, max = 50))]
    pub user_phone: String,
    #[validate(length(min = 10))]
    pub billing_address: String,
    pub special_requests: Option<String>,
    #[serde(default)]
    pub launch_updates_preference: bool,
    /// Caller-supplied tip; non-negative, defaults to zero.
    pub tip_amount: Option<Decimal>,
    #[validate(length(min = 1, message = "Booking must contain at least one item"))]
    pub items: Vec<BookingItemRequest>,
}

/// Request DTO for updating booking status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Response DTO for a booking line.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingItemResponse {
    pub id: Uuid,
    pub trip_id: Option<Uuid>,
    pub boat_id: Option<Uuid>,
    pub item_type: ItemType,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub status: ItemStatus,
}

impl From<BookingItem> for BookingItemResponse {
    fn from(item: BookingItem) -> Self {
        Self {
            id: item.id,
            trip_id: item.trip_id,
            boat_id: item.boat_id,
            item_type: item.item_type,
            quantity: item.quantity,
            price_per_unit: item.price_per_unit,
            status: item.status,
        }
    }
}

/// Response DTO for a booking with its lines.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub confirmation_code: String,
    pub mission_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_reference: Option<String>,
    pub status: BookingStatus,
    pub launch_updates_preference: bool,
    pub items: Vec<BookingItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn from_parts(booking: Booking, items: Vec<BookingItem>) -> Self {
        Self {
            id: booking.id,
            confirmation_code: booking.confirmation_code,
            mission_id: booking.mission_id,
            user_name: booking.user_name,
            user_email: booking.user_email,
            subtotal: booking.subtotal,
            discount_amount: booking.discount_amount,
            tax_amount: booking.tax_amount,
            tip_amount: booking.tip_amount,
            total_amount: booking.total_amount,
            payment_reference: booking.payment_reference,
            status: booking.status,
            launch_updates_preference: booking.launch_updates_preference,
            items: items.into_iter().map(Into::into).collect(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// How the payment step concluded for a freshly created booking.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Confirmed { reference: String },
    /// Payment declined but the booking was kept pending for retry
    /// (only under the keep-pending policy).
    DeclinedPending { reason: String },
}

/// How the post-commit confirmation delivery concluded. A failure here is
/// a warning; the booking itself stands.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    Failed { reason: String },
    /// No confirmation is sent for bookings that are not confirmed.
    Skipped,
}
