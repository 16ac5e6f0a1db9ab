use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Kind of scheduled departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    LaunchViewing,
    PreLaunch,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::LaunchViewing => "launch_viewing",
            TripType::PreLaunch => "pre_launch",
        }
    }
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sellable campaign tied to one launch event. Read-only during booking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Mission {
    pub id: Uuid,
    pub launch_id: String,
    pub name: String,
    /// Stable identifier linking this record to the mission catalog.
    pub config_id: Option<String>,
    pub sales_open_at: DateTime<Utc>,
    pub active: bool,
    pub public: bool,
    pub refund_cutoff_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled departure belonging to one mission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Trip {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub trip_type: TripType,
    pub config_id: Option<String>,
    pub active: bool,
    pub check_in_time: DateTime<Utc>,
    pub boarding_time: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vessel with a base passenger capacity, owned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Boat {
    pub id: Uuid,
    pub name: String,
    pub config_id: Option<String>,
    pub capacity: i32,
    pub provider_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a mission record.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMission {
    #[validate(length(min = 1, max = 255))]
    pub launch_id: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub config_id: String,
    pub sales_open_at: DateTime<Utc>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub refund_cutoff_hours: Option<i32>,
}

/// Request DTO for updating a mission record. Omitted fields keep their
/// current values.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMission {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub sales_open_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub public: Option<bool>,
    pub refund_cutoff_hours: Option<i32>,
}
