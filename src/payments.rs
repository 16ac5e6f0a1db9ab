// Payment adapter seam. The allocator only depends on this narrow
// contract; a real gateway integration slots in behind it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Successful charge: the external transaction reference to record.
#[derive(Debug, Clone)]
pub struct ChargeReceipt {
    pub reference: String,
}

/// A declined charge. Not a transport failure; the processor answered
/// and said no.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct PaymentDecline {
    pub reason: String,
}

/// Charges a booking total. Returns within the request; no settlement
/// guarantees beyond that.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, amount: Decimal, booking_id: Uuid)
        -> Result<ChargeReceipt, PaymentDecline>;
}

/// Mock processor: approves every charge with a generated reference.
pub struct MockPaymentProcessor;

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn charge(
        &self,
        amount: Decimal,
        booking_id: Uuid,
    ) -> Result<ChargeReceipt, PaymentDecline> {
        let reference = format!("mock_pi_{}", Uuid::new_v4());
        tracing::info!(
            "Mock payment of {} approved for booking {} (reference {})",
            amount,
            booking_id,
            reference
        );
        Ok(ChargeReceipt { reference })
    }
}

/// Processor that declines everything. Used to exercise the declined-
/// payment policies.
pub struct DecliningPaymentProcessor {
    pub reason: String,
}

#[async_trait]
impl PaymentProcessor for DecliningPaymentProcessor {
    async fn charge(
        &self,
        amount: Decimal,
        booking_id: Uuid,
    ) -> Result<ChargeReceipt, PaymentDecline> {
        tracing::warn!(
            "Declining payment of {} for booking {}: {}",
            amount,
            booking_id,
            self.reason
        );
        Err(PaymentDecline {
            reason: self.reason.clone(),
        })
    }
}
