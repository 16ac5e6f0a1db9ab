use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::bookings::{
    BookingError, BookingResponse, BookingStatus, BookingsRepository, CapacityLedger,
    CreateBookingRequest, LineQuote, NewBooking, NotificationOutcome, PaymentOutcome,
    PriceCalculator, SeatPlan, StatusMachine,
};
use crate::codes::CodeGenerator;
use crate::config::MissionCatalog;
use crate::notifications::{CheckInPass, ConfirmationSender};
use crate::payments::PaymentProcessor;

/// What to do when the payment processor declines the charge for a
/// freshly built booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclinedPaymentPolicy {
    /// Roll the whole transaction back; no booking exists afterwards.
    /// The default: a pending booking with inserted seat items would
    /// keep counting against capacity for a purchase that never settled.
    #[default]
    RollBack,
    /// Commit the booking in `pending_payment` so the purchaser can
    /// retry the charge later.
    KeepPending,
}

impl DeclinedPaymentPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "roll_back" => Some(DeclinedPaymentPolicy::RollBack),
            "keep_pending" => Some(DeclinedPaymentPolicy::KeepPending),
            _ => None,
        }
    }
}

/// Result of a booking creation: the committed booking plus how the
/// payment and confirmation-delivery steps concluded.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreationResponse {
    pub booking: BookingResponse,
    pub payment: PaymentOutcome,
    pub notification: NotificationOutcome,
    /// Present only for confirmed bookings.
    pub check_in_pass: Option<CheckInPass>,
}

/// The booking allocator. Owns the all-or-nothing contract: validation,
/// pricing, capacity checks and persistence run inside one transaction,
/// and any failure before commit leaves no trace.
#[derive(Clone)]
pub struct BookingService {
    repo: BookingsRepository,
    catalog: Arc<MissionCatalog>,
    payments: Arc<dyn PaymentProcessor>,
    notifier: Arc<dyn ConfirmationSender>,
    codes: Arc<dyn CodeGenerator>,
    declined_policy: DeclinedPaymentPolicy,
}

impl BookingService {
    pub fn new(
        repo: BookingsRepository,
        catalog: Arc<MissionCatalog>,
        payments: Arc<dyn PaymentProcessor>,
        notifier: Arc<dyn ConfirmationSender>,
        codes: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            repo,
            catalog,
            payments,
            notifier,
            codes,
            declined_policy: DeclinedPaymentPolicy::default(),
        }
    }

    pub fn with_declined_policy(mut self, policy: DeclinedPaymentPolicy) -> Self {
        self.declined_policy = policy;
        self
    }

    /// Create a booking.
    ///
    /// Steps 1-9 (validation, pricing, capacity, persistence) and the
    /// payment charge run inside one database transaction. The
    /// confirmation dispatch happens after commit and cannot undo it.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingCreationResponse, BookingError> {
        // Request-shape checks before any datastore work.
        if request.items.is_empty() {
            return Err(BookingError::EmptyBooking);
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(BookingError::InvalidQuantity(format!(
                    "Quantity for {} must be positive, got {}",
                    item.item_type, item.quantity
                )));
            }
            if item.item_type.is_seat() && item.boat_id.is_none() {
                return Err(BookingError::ValidationError(format!(
                    "Item of type {} requires a boat",
                    item.item_type
                )));
            }
        }
        let tip = request.tip_amount.unwrap_or(Decimal::ZERO);
        if tip.is_sign_negative() {
            return Err(BookingError::ValidationError(
                "Tip amount must not be negative".to_string(),
            ));
        }

        // One snapshot per request; a concurrent reload cannot change
        // prices mid-booking.
        let catalog = self.catalog.snapshot();
        let mut tx = self.repo.begin().await?;

        // 1. Mission record.
        let mission = BookingsRepository::find_mission_tx(&mut tx, request.mission_id)
            .await?
            .ok_or(BookingError::MissionNotFound(request.mission_id))?;
        let mission_config_id = mission.config_id.clone().ok_or_else(|| {
            BookingError::ConfigurationInconsistent(format!(
                "mission {} has no config id",
                mission.id
            ))
        })?;

        // 2. Mission configuration: missing or inactive means the mission
        // exists but cannot accept sales.
        match catalog.mission(&mission_config_id) {
            Some(config) if config.active => {}
            _ => {
                return Err(BookingError::MissionInvalid(format!(
                    "mission '{}' is not open for booking",
                    mission_config_id
                )))
            }
        }

        let mut lines: Vec<LineQuote> = Vec::new();
        let mut line_totals: Vec<Decimal> = Vec::new();
        let mut total_quantity: i64 = 0;
        let mut tax_jurisdiction: Option<String> = None;
        // Seat demand accumulates here per (trip, boat) pair; locks and
        // capacity checks run afterwards in the plan's canonical order.
        let mut seat_plan = SeatPlan::new();

        for item in &request.items {
            // 3. Resolve trip and boat records.
            let trip = BookingsRepository::find_trip_tx(&mut tx, item.trip_id)
                .await?
                .ok_or(BookingError::TripNotFound(item.trip_id))?;
            if trip.mission_id != mission.id {
                return Err(BookingError::ValidationError(format!(
                    "Trip {} does not belong to mission {}",
                    trip.id, mission.id
                )));
            }
            let trip_config_id = trip.config_id.clone().ok_or_else(|| {
                BookingError::ConfigurationInconsistent(format!(
                    "trip {} has no config id",
                    trip.id
                ))
            })?;

            let boat = match item.boat_id {
                Some(boat_id) => Some(
                    BookingsRepository::find_boat_tx(&mut tx, boat_id)
                        .await?
                        .ok_or(BookingError::BoatNotFound(boat_id))?,
                ),
                None => None,
            };

            // Tax follows the first item in request order with a
            // resolvable jurisdiction.
            if tax_jurisdiction.is_none() {
                if let Some(boat) = &boat {
                    tax_jurisdiction = Some(boat.jurisdiction_id.clone());
                }
            }

            // 4. Trip configuration and unit price.
            if catalog.trip(&mission_config_id, &trip_config_id).is_none() {
                return Err(BookingError::ConfigurationInconsistent(format!(
                    "trip config '{}' missing for mission '{}'",
                    trip_config_id, mission_config_id
                )));
            }
            let unit_price = catalog
                .trip_price(&mission_config_id, &trip_config_id, item.item_type.as_str())
                .ok_or_else(|| BookingError::PriceNotConfigured {
                    item_type: item.item_type.to_string(),
                    trip_id: trip.id,
                })?;

            // 6. Plan seat demand; the actual lock and check happen after
            // all items are resolved, in canonical pair order.
            if item.item_type.is_seat() {
                let Some(boat) = boat.as_ref() else {
                    return Err(BookingError::ValidationError(format!(
                        "Item of type {} requires a boat",
                        item.item_type
                    )));
                };
                let boat_config_id = boat.config_id.clone().ok_or_else(|| {
                    BookingError::ConfigurationInconsistent(format!(
                        "boat {} has no config id",
                        boat.id
                    ))
                })?;
                let override_capacity = catalog
                    .boat_override(&mission_config_id, &trip_config_id, &boat_config_id)
                    .and_then(|b| b.max_capacity);
                let effective = CapacityLedger::effective_capacity(override_capacity, boat.capacity);

                CapacityLedger::add_demand(
                    &mut seat_plan,
                    trip.id,
                    boat.id,
                    item.quantity,
                    effective,
                    &boat_config_id,
                    &trip_config_id,
                );
            }

            line_totals.push(PriceCalculator::line_total(item.quantity, unit_price));
            total_quantity += i64::from(item.quantity);
            lines.push(LineQuote {
                trip_id: trip.id,
                boat_id: boat.as_ref().map(|b| b.id),
                item_type: item.item_type,
                quantity: item.quantity,
                unit_price,
            });
        }

        // 6b. Capacity checks. The plan iterates pairs sorted by
        // (trip_id, boat_id), so every transaction takes its row locks in
        // the same order and opposite-order requests cannot deadlock.
        for ((trip_id, boat_id), demand) in &seat_plan {
            CapacityLedger::lock_pair(&mut tx, *trip_id, *boat_id).await?;
            let booked = CapacityLedger::booked_capacity(&mut tx, *trip_id, *boat_id).await?;
            if !CapacityLedger::admits(booked, demand.requested, demand.effective_capacity) {
                return Err(BookingError::InsufficientCapacity {
                    boat: demand.boat_config_id.clone(),
                    trip: demand.trip_config_id.clone(),
                });
            }
        }

        // 7. Unreachable given the per-item check, but zero-item totals
        // must never reach persistence.
        if total_quantity == 0 {
            return Err(BookingError::EmptyBooking);
        }

        // 8. Totals.
        let subtotal = PriceCalculator::subtotal(&line_totals);
        let tax_rate = match &tax_jurisdiction {
            Some(id) => BookingsRepository::jurisdiction_tax_rate_tx(&mut tx, id)
                .await?
                .unwrap_or(Decimal::ZERO),
            None => Decimal::ZERO,
        };
        let tax = PriceCalculator::tax_amount(subtotal, tax_rate);
        let totals = PriceCalculator::totals(subtotal, tax, tip);

        // 9. Persist booking and items, still inside the transaction.
        let confirmation_code = self.codes.generate();
        let booking_id = Uuid::new_v4();
        let new_booking = NewBooking {
            id: booking_id,
            confirmation_code: &confirmation_code,
            mission_id: mission.id,
            user_name: &request.user_name,
            user_email: &request.user_email,
            user_phone: &request.user_phone,
            billing_address: &request.billing_address,
            special_requests: request.special_requests.as_deref(),
            launch_updates_preference: request.launch_updates_preference,
            totals,
        };
        BookingsRepository::insert_booking_tx(&mut tx, &new_booking).await?;
        BookingsRepository::insert_items_tx(&mut tx, booking_id, &lines).await?;

        // 10. Charge the computed total.
        let payment = match self.payments.charge(totals.total, booking_id).await {
            Ok(receipt) => {
                BookingsRepository::confirm_booking_tx(&mut tx, booking_id, &receipt.reference)
                    .await?;
                BookingsRepository::insert_payment_tx(
                    &mut tx,
                    booking_id,
                    totals.total,
                    &receipt.reference,
                )
                .await?;
                PaymentOutcome::Confirmed {
                    reference: receipt.reference,
                }
            }
            Err(decline) => match self.declined_policy {
                DeclinedPaymentPolicy::RollBack => {
                    // Returning drops the transaction; nothing persists.
                    return Err(BookingError::PaymentDeclined(decline.reason));
                }
                DeclinedPaymentPolicy::KeepPending => {
                    tracing::warn!(
                        "Payment declined for booking {}; keeping it pending: {}",
                        booking_id,
                        decline.reason
                    );
                    PaymentOutcome::DeclinedPending {
                        reason: decline.reason,
                    }
                }
            },
        };

        // 11. Commit. The booking becomes visible system-wide here.
        tx.commit().await?;
        tracing::info!(
            "Booking {} committed with confirmation code {}",
            booking_id,
            confirmation_code
        );

        // 12. Post-commit: re-read and dispatch the confirmation.
        let booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;
        let items = self.repo.items_for(booking_id).await?;

        let (check_in_pass, notification) = if booking.status == BookingStatus::Confirmed {
            let pass = CheckInPass::new(booking.id, &booking.confirmation_code);
            let notification = match self.notifier.send_confirmation(&booking, &pass).await {
                Ok(()) => NotificationOutcome::Sent,
                Err(err) => {
                    tracing::warn!(
                        "Confirmation delivery failed for booking {}: {}",
                        booking.id,
                        err
                    );
                    NotificationOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            (Some(pass), notification)
        } else {
            (None, NotificationOutcome::Skipped)
        };

        Ok(BookingCreationResponse {
            booking: BookingResponse::from_parts(booking, items),
            payment,
            notification,
            check_in_pass,
        })
    }

    /// Fetch one booking with its items.
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<BookingResponse, BookingError> {
        let booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;
        let items = self.repo.items_for(booking_id).await?;
        Ok(BookingResponse::from_parts(booking, items))
    }

    /// List all bookings with their items, newest first.
    pub async fn list_bookings(&self) -> Result<Vec<BookingResponse>, BookingError> {
        let bookings = self.repo.list().await?;

        let mut responses = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let items = self.repo.items_for(booking.id).await?;
            responses.push(BookingResponse::from_parts(booking, items));
        }

        Ok(responses)
    }

    /// Transition a booking's status, guarded by the status machine.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<BookingResponse, BookingError> {
        let booking = self
            .repo
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        StatusMachine::transition(booking.status, new_status)
            .map_err(BookingError::InvalidTransition)?;

        // Guarded by the status just validated; a concurrent transition
        // surfaces as a conflict instead of silently winning.
        let updated = self
            .repo
            .update_status(booking_id, new_status, booking.status)
            .await?;
        let items = self.repo.items_for(booking_id).await?;
        tracing::info!(
            "Booking {} transitioned {} -> {}",
            booking_id,
            booking.status,
            new_status
        );

        Ok(BookingResponse::from_parts(updated, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::{BookingItemRequest, ItemType};
    use crate::codes::FixedCodeGenerator;
    use crate::config::CatalogSnapshot;
    use crate::notifications::LoggingEmailSender;
    use crate::payments::MockPaymentProcessor;
    use rust_decimal_macros::dec;
    use sqlx::postgres::PgPoolOptions;

    const FIXTURE: &str = r#"
launch:
  id: artemis-2
  name: Artemis II
  date_time: 2026-09-20T12:45:00Z
  location_id: cape-canaveral
missions:
  - id: artemis-2-viewing
    name: Artemis II Launch Viewing
    launch_id: artemis-2
    active: true
    public: true
    sales_open_at: 2026-06-01T00:00:00Z
    trips: []
"#;

    /// Service over a lazy pool: no connection is made unless a query
    /// actually runs, so request-shape rejections must succeed and
    /// anything touching the datastore would fail loudly.
    fn detached_service() -> BookingService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://unused@localhost:1/unused")
            .unwrap();
        let snapshot: CatalogSnapshot = serde_yaml::from_str(FIXTURE).unwrap();
        BookingService::new(
            BookingsRepository::new(pool),
            Arc::new(MissionCatalog::from_snapshot(snapshot)),
            Arc::new(MockPaymentProcessor),
            Arc::new(LoggingEmailSender::new("noreply@example.com")),
            Arc::new(FixedCodeGenerator::new("TESTCODE")),
        )
    }

    fn base_request(items: Vec<BookingItemRequest>) -> CreateBookingRequest {
        CreateBookingRequest {
            mission_id: Uuid::new_v4(),
            user_name: "Ada Lovelace".to_string(),
            user_email: "ada@example.com".to_string(),
            user_phone: "+1 555 0100".to_string(),
            billing_address: "1 Rocket Road, Cape Canaveral".to_string(),
            special_requests: None,
            launch_updates_preference: false,
            tip_amount: None,
            items,
        }
    }

    #[tokio::test]
    async fn empty_item_list_is_rejected_before_any_db_work() {
        let service = detached_service();
        let err = service.create_booking(base_request(vec![])).await.unwrap_err();
        assert!(matches!(err, BookingError::EmptyBooking));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_before_any_db_work() {
        let service = detached_service();
        let request = base_request(vec![BookingItemRequest {
            trip_id: Uuid::new_v4(),
            boat_id: Some(Uuid::new_v4()),
            item_type: ItemType::AdultTicket,
            quantity: 0,
        }]);
        let err = service.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidQuantity(_)));
    }

    #[tokio::test]
    async fn seat_item_without_boat_is_rejected() {
        let service = detached_service();
        let request = base_request(vec![BookingItemRequest {
            trip_id: Uuid::new_v4(),
            boat_id: None,
            item_type: ItemType::ChildTicket,
            quantity: 2,
        }]);
        let err = service.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::ValidationError(_)));
    }

    #[tokio::test]
    async fn negative_tip_is_rejected() {
        let service = detached_service();
        let mut request = base_request(vec![BookingItemRequest {
            trip_id: Uuid::new_v4(),
            boat_id: Some(Uuid::new_v4()),
            item_type: ItemType::AdultTicket,
            quantity: 1,
        }]);
        request.tip_amount = Some(dec!(-5.00));
        let err = service.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::ValidationError(_)));
    }

    #[test]
    fn declined_policy_parses_known_values() {
        assert_eq!(
            DeclinedPaymentPolicy::parse("roll_back"),
            Some(DeclinedPaymentPolicy::RollBack)
        );
        assert_eq!(
            DeclinedPaymentPolicy::parse("keep_pending"),
            Some(DeclinedPaymentPolicy::KeepPending)
        );
        assert_eq!(DeclinedPaymentPolicy::parse("retry"), None);
    }

    #[test]
    fn declined_policy_defaults_to_roll_back() {
        assert_eq!(
            DeclinedPaymentPolicy::default(),
            DeclinedPaymentPolicy::RollBack
        );
    }
}
