// Mission catalog: the read-only configuration source for pricing,
// schedules, and per-trip boat capacity overrides.
//
// The catalog is loaded once at startup from a YAML document and exposed as
// an immutable snapshot behind an Arc. Reloading parses a whole new snapshot
// and swaps the Arc; in-flight requests keep reading the snapshot they
// started with.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::error::CatalogError;
use crate::fleet::TripType;

/// The launch event this catalog sells trips for.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    pub id: String,
    pub name: String,
    pub date_time: DateTime<Utc>,
    pub location_id: String,
}

/// Per-trip capacity override for one boat. A missing `max_capacity`
/// means "use the boat's base capacity".
#[derive(Debug, Clone, Deserialize)]
pub struct BoatOverride {
    pub boat_id: String,
    pub max_capacity: Option<i32>,
}

/// One scheduled departure within a mission.
#[derive(Debug, Clone, Deserialize)]
pub struct TripConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub trip_type: TripType,
    pub check_in_time: DateTime<Utc>,
    pub boarding_time: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
    /// Unit prices keyed by item-type wire name (`adult_ticket`, ...).
    /// An absent key means the item is not sold on this trip, which is
    /// distinct from a configured price of zero.
    pub pricing: HashMap<String, Decimal>,
    #[serde(default)]
    pub boats: Vec<BoatOverride>,
}

/// One sellable campaign tied to the launch.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionConfig {
    pub id: String,
    pub name: String,
    pub launch_id: String,
    pub active: bool,
    pub public: bool,
    pub sales_open_at: DateTime<Utc>,
    #[serde(default = "default_refund_cutoff_hours")]
    pub refund_cutoff_hours: i32,
    pub trips: Vec<TripConfig>,
}

fn default_refund_cutoff_hours() -> i32 {
    12
}

/// A fully parsed, validated catalog document. Immutable once built.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSnapshot {
    pub launch: LaunchConfig,
    pub missions: Vec<MissionConfig>,
}

impl CatalogSnapshot {
    pub fn mission(&self, config_id: &str) -> Option<&MissionConfig> {
        self.missions.iter().find(|m| m.id == config_id)
    }

    pub fn trip(&self, mission_id: &str, trip_id: &str) -> Option<&TripConfig> {
        self.mission(mission_id)?
            .trips
            .iter()
            .find(|t| t.id == trip_id)
    }

    /// Configured unit price for an item type on a trip. `None` means the
    /// item type is not sold there.
    pub fn trip_price(&self, mission_id: &str, trip_id: &str, item_type: &str) -> Option<Decimal> {
        self.trip(mission_id, trip_id)?.pricing.get(item_type).copied()
    }

    /// Per-trip boat entry, carrying the optional capacity override.
    pub fn boat_override(
        &self,
        mission_id: &str,
        trip_id: &str,
        boat_config_id: &str,
    ) -> Option<&BoatOverride> {
        self.trip(mission_id, trip_id)?
            .boats
            .iter()
            .find(|b| b.boat_id == boat_config_id)
    }
}

/// Handle to the current catalog snapshot, with atomic reload.
#[derive(Debug)]
pub struct MissionCatalog {
    path: PathBuf,
    inner: RwLock<Arc<CatalogSnapshot>>,
}

impl MissionCatalog {
    /// Load the catalog from a YAML file. A missing file or invalid
    /// structure is an error; callers at startup treat it as fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let snapshot = read_snapshot(&path)?;
        tracing::info!(
            "Loaded mission catalog from {} ({} missions)",
            path.display(),
            snapshot.missions.len()
        );
        Ok(Self {
            path,
            inner: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Build a catalog directly from a snapshot, bypassing the filesystem.
    #[cfg(test)]
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            path: PathBuf::new(),
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Cheap; clones an Arc.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the backing file and swap the snapshot in one step.
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let snapshot = read_snapshot(&self.path)?;
        let missions = snapshot.missions.len();
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        tracing::info!(
            "Reloaded mission catalog from {} ({} missions)",
            self.path.display(),
            missions
        );
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<CatalogSnapshot, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: CatalogSnapshot = serde_yaml::from_str(&contents)?;
    validate(&snapshot)?;
    Ok(snapshot)
}

/// Structural checks beyond what serde enforces. These guard against a
/// catalog that parses but would misprice or miscount capacity.
fn validate(snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
    if snapshot.missions.is_empty() {
        return Err(CatalogError::Invalid(
            "catalog must define at least one mission".to_string(),
        ));
    }

    let mut mission_ids = HashSet::new();
    for mission in &snapshot.missions {
        if !mission_ids.insert(mission.id.as_str()) {
            return Err(CatalogError::Invalid(format!(
                "duplicate mission id '{}'",
                mission.id
            )));
        }
        if mission.launch_id != snapshot.launch.id {
            return Err(CatalogError::Invalid(format!(
                "mission '{}' references unknown launch '{}'",
                mission.id, mission.launch_id
            )));
        }

        let mut trip_ids = HashSet::new();
        for trip in &mission.trips {
            if !trip_ids.insert(trip.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate trip id '{}' in mission '{}'",
                    trip.id, mission.id
                )));
            }
            for (item_type, price) in &trip.pricing {
                if price.is_sign_negative() {
                    return Err(CatalogError::Invalid(format!(
                        "negative price for '{}' on trip '{}'",
                        item_type, trip.id
                    )));
                }
            }
            for boat in &trip.boats {
                if let Some(cap) = boat.max_capacity {
                    if cap <= 0 {
                        return Err(CatalogError::Invalid(format!(
                            "non-positive capacity override for boat '{}' on trip '{}'",
                            boat.boat_id, trip.id
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}
