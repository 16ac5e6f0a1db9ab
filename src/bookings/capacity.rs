// Capacity ledger: committed seat accounting for a (trip, boat) pair.
//
// Correctness depends on serializing concurrent capacity checks for the
// same pair. Before reading the committed sum, the ledger takes a row lock
// on the aggregate key (the trip_boats assignment row, or the boats row
// when no assignment exists). Two transactions admitting seats for the
// same pair therefore queue behind each other, and the committed sum can
// never exceed the effective capacity.
//
// Lock acquisition must follow one canonical order across all
// transactions, or two multi-pair bookings taking pairs in opposite
// orders deadlock. `SeatPlan` is a BTreeMap keyed by (trip_id, boat_id),
// so iterating it visits pairs in sorted order no matter how the request
// listed its items.

use std::collections::BTreeMap;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::bookings::error::BookingError;

/// Aggregated seat demand for one (trip, boat) pair. Quantities from
/// every seat item in the request targeting the pair are summed here, so
/// a request cannot overfill a boat by splitting quantities.
#[derive(Debug, Clone)]
pub struct SeatDemand {
    pub requested: i64,
    pub effective_capacity: i32,
    /// Catalog ids carried for error reporting.
    pub boat_config_id: String,
    pub trip_config_id: String,
}

/// Seat demand for a whole request, keyed by (trip_id, boat_id).
/// Iteration order is the canonical lock order.
pub type SeatPlan = BTreeMap<(Uuid, Uuid), SeatDemand>;

/// Service for seat-capacity accounting inside the allocator transaction.
pub struct CapacityLedger;

impl CapacityLedger {
    /// Record demand for a pair, summing with any demand already planned.
    pub fn add_demand(
        plan: &mut SeatPlan,
        trip_id: Uuid,
        boat_id: Uuid,
        quantity: i32,
        effective_capacity: i32,
        boat_config_id: &str,
        trip_config_id: &str,
    ) {
        plan.entry((trip_id, boat_id))
            .and_modify(|d| d.requested += i64::from(quantity))
            .or_insert_with(|| SeatDemand {
                requested: i64::from(quantity),
                effective_capacity,
                boat_config_id: boat_config_id.to_string(),
                trip_config_id: trip_config_id.to_string(),
            });
    }

    /// Lock the aggregate row for a (trip, boat) pair. Must be called on
    /// the allocator's open transaction before `booked_capacity`; the lock
    /// is held until commit or rollback.
    pub async fn lock_pair(
        tx: &mut Transaction<'_, Postgres>,
        trip_id: Uuid,
        boat_id: Uuid,
    ) -> Result<(), BookingError> {
        let assignment: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM trip_boats WHERE trip_id = $1 AND boat_id = $2 FOR UPDATE",
        )
        .bind(trip_id)
        .bind(boat_id)
        .fetch_optional(&mut **tx)
        .await?;

        if assignment.is_none() {
            // No assignment row; lock the boat itself so concurrent checks
            // for this boat still serialize.
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM boats WHERE id = $1 FOR UPDATE")
                .bind(boat_id)
                .fetch_optional(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Committed seat count for a (trip, boat) pair: the sum of quantities
    /// over all active, seat-typed booking items.
    pub async fn booked_capacity(
        tx: &mut Transaction<'_, Postgres>,
        trip_id: Uuid,
        boat_id: Uuid,
    ) -> Result<i64, BookingError> {
        let booked: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(quantity)::BIGINT
            FROM booking_items
            WHERE trip_id = $1
              AND boat_id = $2
              AND status = 'active'
              AND item_type IN ('adult_ticket', 'child_ticket')
            "#,
        )
        .bind(trip_id)
        .bind(boat_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(booked.unwrap_or(0))
    }

    /// Capacity in force for a boat on a trip: the per-trip catalog
    /// override when configured, otherwise the boat's base capacity.
    pub fn effective_capacity(override_capacity: Option<i32>, base_capacity: i32) -> i32 {
        override_capacity.unwrap_or(base_capacity)
    }

    /// Admission rule. Exact fill is allowed.
    pub fn admits(booked: i64, requested: i64, effective: i32) -> bool {
        booked + requested <= i64::from(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_takes_precedence_over_base() {
        assert_eq!(CapacityLedger::effective_capacity(Some(50), 120), 50);
    }

    #[test]
    fn base_capacity_used_without_override() {
        assert_eq!(CapacityLedger::effective_capacity(None, 120), 120);
    }

    #[test]
    fn admits_exact_fill() {
        // 48 booked, 2 requested, capacity 50: exact fill succeeds.
        assert!(CapacityLedger::admits(48, 2, 50));
    }

    #[test]
    fn rejects_one_over_capacity() {
        assert!(!CapacityLedger::admits(50, 1, 50));
    }

    #[test]
    fn admits_into_empty_boat() {
        assert!(CapacityLedger::admits(0, 50, 50));
        assert!(!CapacityLedger::admits(0, 51, 50));
    }

    #[test]
    fn plan_sums_demand_for_same_pair() {
        // Two items in one request for the same pair must see each other:
        // 8 + 2 seats is one demand of 10.
        let trip = Uuid::new_v4();
        let boat = Uuid::new_v4();
        let mut plan = SeatPlan::new();
        CapacityLedger::add_demand(&mut plan, trip, boat, 8, 50, "endeavour", "lv-morning");
        CapacityLedger::add_demand(&mut plan, trip, boat, 2, 50, "endeavour", "lv-morning");

        assert_eq!(plan.len(), 1);
        let demand = &plan[&(trip, boat)];
        assert_eq!(demand.requested, 10);
        assert!(CapacityLedger::admits(40, demand.requested, 50));
        assert!(!CapacityLedger::admits(41, demand.requested, 50));
    }

    #[test]
    fn plan_iterates_pairs_in_one_canonical_order() {
        // Whatever order a request lists its items in, the plan visits
        // pairs sorted by (trip_id, boat_id), so every transaction takes
        // its row locks in the same order.
        let trip = Uuid::new_v4();
        let boat_a = Uuid::new_v4();
        let boat_b = Uuid::new_v4();

        let mut forward = SeatPlan::new();
        CapacityLedger::add_demand(&mut forward, trip, boat_a, 1, 50, "a", "t");
        CapacityLedger::add_demand(&mut forward, trip, boat_b, 1, 50, "b", "t");

        let mut reversed = SeatPlan::new();
        CapacityLedger::add_demand(&mut reversed, trip, boat_b, 1, 50, "b", "t");
        CapacityLedger::add_demand(&mut reversed, trip, boat_a, 1, 50, "a", "t");

        let forward_keys: Vec<_> = forward.keys().copied().collect();
        let reversed_keys: Vec<_> = reversed.keys().copied().collect();
        assert_eq!(forward_keys, reversed_keys);
    }
}
