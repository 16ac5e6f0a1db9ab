// HTTP handlers for the thin record-management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::fleet::{Boat, CreateMission, Mission, Trip, UpdateMission};

/// Query parameters for trip listing
#[derive(Debug, Deserialize)]
pub struct TripListQuery {
    /// Restrict to trips of one mission
    pub mission_id: Option<Uuid>,
}

/// Handler for GET /api/v1/missions
#[utoipa::path(
    get,
    path = "/api/v1/missions",
    responses(
        (status = 200, description = "List of all missions", body = Vec<Mission>),
        (status = 500, description = "Internal server error")
    ),
    tag = "missions"
)]
pub async fn list_missions(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Mission>>, ApiError> {
    let missions = state.fleet_repo.list_missions().await?;
    tracing::debug!("Retrieved {} missions", missions.len());
    Ok(Json(missions))
}

/// Handler for GET /api/v1/missions/:id
#[utoipa::path(
    get,
    path = "/api/v1/missions/{id}",
    params(("id" = Uuid, Path, description = "Mission ID")),
    responses(
        (status = 200, description = "Mission found", body = Mission),
        (status = 404, description = "Mission not found")
    ),
    tag = "missions"
)]
pub async fn get_mission(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mission>, ApiError> {
    let mission = state
        .fleet_repo
        .find_mission(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Mission".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(mission))
}

/// Handler for POST /api/v1/missions
#[utoipa::path(
    post,
    path = "/api/v1/missions",
    request_body = CreateMission,
    responses(
        (status = 201, description = "Mission created", body = Mission),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Duplicate config id")
    ),
    tag = "missions"
)]
pub async fn create_mission(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateMission>,
) -> Result<(StatusCode, Json<Mission>), ApiError> {
    payload.validate()?;

    if db::check_duplicate_mission_config(&state.db, &payload.config_id).await? {
        tracing::warn!(
            "Attempt to create mission with duplicate config id: {}",
            payload.config_id
        );
        return Err(ApiError::Conflict {
            message: format!("Mission with config id '{}' already exists", payload.config_id),
        });
    }

    let mission = state.fleet_repo.create_mission(payload).await?;
    tracing::info!("Created mission {}", mission.id);
    Ok((StatusCode::CREATED, Json(mission)))
}

/// Handler for PUT /api/v1/missions/:id
pub async fn update_mission(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMission>,
) -> Result<Json<Mission>, ApiError> {
    payload.validate()?;

    let mission = state.fleet_repo.update_mission(id, payload).await?;
    tracing::info!("Updated mission {}", id);
    Ok(Json(mission))
}

/// Handler for DELETE /api/v1/missions/:id
pub async fn delete_mission(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.fleet_repo.delete_mission(id).await? {
        return Err(ApiError::NotFound {
            resource: "Mission".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Deleted mission {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/v1/trips
#[utoipa::path(
    get,
    path = "/api/v1/trips",
    params(("mission_id" = Option<Uuid>, Query, description = "Filter by mission")),
    responses((status = 200, description = "List of trips", body = Vec<Trip>)),
    tag = "trips"
)]
pub async fn list_trips(
    State(state): State<crate::AppState>,
    Query(query): Query<TripListQuery>,
) -> Result<Json<Vec<Trip>>, ApiError> {
    let trips = state.fleet_repo.list_trips(query.mission_id).await?;
    Ok(Json(trips))
}

/// Handler for GET /api/v1/trips/:id
pub async fn get_trip(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, ApiError> {
    let trip = state
        .fleet_repo
        .find_trip(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Trip".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(trip))
}

/// Handler for GET /api/v1/boats
#[utoipa::path(
    get,
    path = "/api/v1/boats",
    responses((status = 200, description = "List of boats", body = Vec<Boat>)),
    tag = "boats"
)]
pub async fn list_boats(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<Boat>>, ApiError> {
    let boats = state.fleet_repo.list_boats().await?;
    Ok(Json(boats))
}

/// Handler for GET /api/v1/boats/:id
pub async fn get_boat(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Boat>, ApiError> {
    let boat = state
        .fleet_repo
        .find_boat(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Boat".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(boat))
}
