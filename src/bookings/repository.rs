use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::bookings::error::BookingError;
use crate::bookings::models::{Booking, BookingItem, BookingStatus, ItemType};
use crate::bookings::pricing::BookingTotals;
use crate::fleet::{Mission, Trip};

/// Boat record joined with its provider's jurisdiction, as the allocator
/// needs it: capacity for the ledger, config id for the catalog lookup,
/// jurisdiction for tax.
#[derive(Debug, Clone, FromRow)]
pub struct BoatForBooking {
    pub id: Uuid,
    pub name: String,
    pub config_id: Option<String>,
    pub capacity: i32,
    pub jurisdiction_id: String,
}

/// A priced line ready for insertion, with the unit price frozen.
#[derive(Debug, Clone)]
pub struct LineQuote {
    pub trip_id: Uuid,
    pub boat_id: Option<Uuid>,
    pub item_type: ItemType,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Everything needed to insert the booking row.
#[derive(Debug)]
pub struct NewBooking<'a> {
    pub id: Uuid,
    pub confirmation_code: &'a str,
    pub mission_id: Uuid,
    pub user_name: &'a str,
    pub user_email: &'a str,
    pub user_phone: &'a str,
    pub billing_address: &'a str,
    pub special_requests: Option<&'a str>,
    pub launch_updates_preference: bool,
    pub totals: BookingTotals,
}

const BOOKING_COLUMNS: &str = "id, confirmation_code, mission_id, user_name, user_email, user_phone, \
     billing_address, subtotal, discount_amount, tax_amount, tip_amount, total_amount, \
     payment_reference, special_requests, status, launch_updates_preference, created_at, updated_at";

/// Repository for booking persistence. The allocator runs its reads and
/// writes on one transaction obtained from `begin`; plain reads for
/// responses go through the pool.
#[derive(Clone)]
pub struct BookingsRepository {
    pool: PgPool,
}

impl BookingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, BookingError> {
        Ok(self.pool.begin().await?)
    }

    // --- Transaction-scoped reads used by the allocator ---

    pub async fn find_mission_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Mission>, BookingError> {
        let mission = sqlx::query_as::<_, Mission>(
            r#"
            SELECT id, launch_id, name, config_id, sales_open_at, active, public,
                   refund_cutoff_hours, created_at, updated_at
            FROM missions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(mission)
    }

    pub async fn find_trip_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Trip>, BookingError> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            SELECT id, mission_id, trip_type, config_id, active, check_in_time,
                   boarding_time, departure_time, created_at, updated_at
            FROM trips
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(trip)
    }

    pub async fn find_boat_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<BoatForBooking>, BookingError> {
        let boat = sqlx::query_as::<_, BoatForBooking>(
            r#"
            SELECT b.id, b.name, b.config_id, b.capacity, p.jurisdiction_id
            FROM boats b
            JOIN boat_providers p ON p.id = b.provider_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(boat)
    }

    pub async fn jurisdiction_tax_rate_tx(
        tx: &mut Transaction<'_, Postgres>,
        jurisdiction_id: &str,
    ) -> Result<Option<Decimal>, BookingError> {
        let rate: Option<Decimal> =
            sqlx::query_scalar("SELECT sales_tax_rate FROM jurisdictions WHERE id = $1")
                .bind(jurisdiction_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(rate)
    }

    // --- Transaction-scoped writes ---

    pub async fn insert_booking_tx(
        tx: &mut Transaction<'_, Postgres>,
        new: &NewBooking<'_>,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (id, confirmation_code, mission_id, user_name, user_email,
                                  user_phone, billing_address, subtotal, discount_amount,
                                  tax_amount, tip_amount, total_amount, special_requests,
                                  status, launch_updates_preference)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending_payment', $14)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new.id)
        .bind(new.confirmation_code)
        .bind(new.mission_id)
        .bind(new.user_name)
        .bind(new.user_email)
        .bind(new.user_phone)
        .bind(new.billing_address)
        .bind(new.totals.subtotal)
        .bind(new.totals.discount)
        .bind(new.totals.tax)
        .bind(new.totals.tip)
        .bind(new.totals.total)
        .bind(new.special_requests)
        .bind(new.launch_updates_preference)
        .fetch_one(&mut **tx)
        .await?;

        Ok(booking)
    }

    pub async fn insert_items_tx(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        lines: &[LineQuote],
    ) -> Result<(), BookingError> {
        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO booking_items (id, booking_id, trip_id, boat_id, item_type,
                                           quantity, price_per_unit, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, 'active')
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(booking_id)
            .bind(line.trip_id)
            .bind(line.boat_id)
            .bind(line.item_type)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Mark a freshly created booking confirmed and attach the external
    /// payment reference.
    pub async fn confirm_booking_tx(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        payment_reference: &str,
    ) -> Result<(), BookingError> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'confirmed', payment_reference = $1, updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(payment_reference)
        .bind(booking_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn insert_payment_tx(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        amount: Decimal,
        payment_reference: &str,
    ) -> Result<(), BookingError> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, booking_id, amount, payment_reference, status)
            VALUES ($1, $2, $3, $4, 'paid')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(amount)
        .bind(payment_reference)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    // --- Pool reads for responses ---

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn list(&self) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn items_for(&self, booking_id: Uuid) -> Result<Vec<BookingItem>, BookingError> {
        let items = sqlx::query_as::<_, BookingItem>(
            r#"
            SELECT id, booking_id, trip_id, boat_id, item_type, quantity,
                   price_per_unit, status, created_at, updated_at
            FROM booking_items
            WHERE booking_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Transition a booking's status, compare-and-set style: the update
    /// only applies if the row still holds `expected`. A concurrent
    /// transition that got there first makes this a retryable conflict,
    /// never a transition validated against a stale status.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        expected: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = now()
            WHERE id = $2 AND status = $3
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new_status)
        .bind(booking_id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(booking) => Ok(booking),
            None => match self.find_by_id(booking_id).await? {
                Some(_) => Err(BookingError::TransactionConflict),
                None => Err(BookingError::NotFound),
            },
        }
    }
}
