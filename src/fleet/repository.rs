use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::fleet::{Boat, CreateMission, Mission, Trip, UpdateMission};

/// Repository for the sellable-inventory records (missions, trips, boats).
/// Thin record management; the booking allocator does its own reads inside
/// its transaction.
#[derive(Clone)]
pub struct FleetRepository {
    pool: PgPool,
}

impl FleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_missions(&self) -> Result<Vec<Mission>, ApiError> {
        let missions = sqlx::query_as::<_, Mission>(
            r#"
            SELECT id, launch_id, name, config_id, sales_open_at, active, public,
                   refund_cutoff_hours, created_at, updated_at
            FROM missions
            ORDER BY sales_open_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(missions)
    }

    pub async fn find_mission(&self, id: Uuid) -> Result<Option<Mission>, ApiError> {
        let mission = sqlx::query_as::<_, Mission>(
            r#"
            SELECT id, launch_id, name, config_id, sales_open_at, active, public,
                   refund_cutoff_hours, created_at, updated_at
            FROM missions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mission)
    }

    pub async fn create_mission(&self, payload: CreateMission) -> Result<Mission, ApiError> {
        let mission = sqlx::query_as::<_, Mission>(
            r#"
            INSERT INTO missions (id, launch_id, name, config_id, sales_open_at, active, public, refund_cutoff_hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, launch_id, name, config_id, sales_open_at, active, public,
                      refund_cutoff_hours, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payload.launch_id)
        .bind(&payload.name)
        .bind(&payload.config_id)
        .bind(payload.sales_open_at)
        .bind(payload.active)
        .bind(payload.public)
        .bind(payload.refund_cutoff_hours.unwrap_or(12))
        .fetch_one(&self.pool)
        .await?;

        Ok(mission)
    }

    /// Update a mission, keeping current values for omitted fields. Runs in
    /// a transaction so the read-modify-write is atomic.
    pub async fn update_mission(
        &self,
        id: Uuid,
        payload: UpdateMission,
    ) -> Result<Mission, ApiError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Mission>(
            r#"
            SELECT id, launch_id, name, config_id, sales_open_at, active, public,
                   refund_cutoff_hours, created_at, updated_at
            FROM missions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Mission".to_string(),
            id: id.to_string(),
        })?;

        let mission = sqlx::query_as::<_, Mission>(
            r#"
            UPDATE missions
            SET name = $1,
                sales_open_at = $2,
                active = $3,
                public = $4,
                refund_cutoff_hours = $5,
                updated_at = now()
            WHERE id = $6
            RETURNING id, launch_id, name, config_id, sales_open_at, active, public,
                      refund_cutoff_hours, created_at, updated_at
            "#,
        )
        .bind(payload.name.unwrap_or(existing.name))
        .bind(payload.sales_open_at.unwrap_or(existing.sales_open_at))
        .bind(payload.active.unwrap_or(existing.active))
        .bind(payload.public.unwrap_or(existing.public))
        .bind(payload.refund_cutoff_hours.unwrap_or(existing.refund_cutoff_hours))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(mission)
    }

    pub async fn delete_mission(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM missions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_trips(&self, mission_id: Option<Uuid>) -> Result<Vec<Trip>, ApiError> {
        let trips = match mission_id {
            Some(mission_id) => {
                sqlx::query_as::<_, Trip>(
                    r#"
                    SELECT id, mission_id, trip_type, config_id, active, check_in_time,
                           boarding_time, departure_time, created_at, updated_at
                    FROM trips
                    WHERE mission_id = $1
                    ORDER BY departure_time
                    "#,
                )
                .bind(mission_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Trip>(
                    r#"
                    SELECT id, mission_id, trip_type, config_id, active, check_in_time,
                           boarding_time, departure_time, created_at, updated_at
                    FROM trips
                    ORDER BY departure_time
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(trips)
    }

    pub async fn find_trip(&self, id: Uuid) -> Result<Option<Trip>, ApiError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            SELECT id, mission_id, trip_type, config_id, active, check_in_time,
                   boarding_time, departure_time, created_at, updated_at
            FROM trips
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trip)
    }

    pub async fn list_boats(&self) -> Result<Vec<Boat>, ApiError> {
        let boats = sqlx::query_as::<_, Boat>(
            r#"
            SELECT id, name, config_id, capacity, provider_id, created_at, updated_at
            FROM boats
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(boats)
    }

    pub async fn find_boat(&self, id: Uuid) -> Result<Option<Boat>, ApiError> {
        let boat = sqlx::query_as::<_, Boat>(
            r#"
            SELECT id, name, config_id, capacity, provider_id, created_at, updated_at
            FROM boats
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(boat)
    }
}
