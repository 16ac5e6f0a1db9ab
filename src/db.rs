use crate::error::ApiError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
///
/// # Returns
/// * `Result<DbPool>` - Configured connection pool or error
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check if a mission with the given config id already exists.
/// Config ids tie mission rows to catalog entries; two rows claiming the
/// same entry would make capacity and pricing lookups ambiguous.
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `config_id` - Catalog config id to check for duplicates
///
/// # Returns
/// * `Result<bool, ApiError>` - True if duplicate exists, false otherwise
pub async fn check_duplicate_mission_config(
    pool: &PgPool,
    config_id: &str,
) -> Result<bool, ApiError> {
    tracing::debug!("Checking for duplicate mission config id: {}", config_id);

    let exists: Option<bool> =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM missions WHERE config_id = $1)")
            .bind(config_id)
            .fetch_one(pool)
            .await?;

    let is_duplicate = exists.unwrap_or(false);
    if is_duplicate {
        tracing::debug!("Duplicate mission config id found: {}", config_id);
    }

    Ok(is_duplicate)
}
