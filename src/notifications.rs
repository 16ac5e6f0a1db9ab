// Notification dispatcher seam. Invoked only after a booking has
// committed and confirmed; a failure here is surfaced to the caller but
// never rolls the booking back.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::bookings::Booking;

/// The shareable check-in artifact for a confirmed booking: the payload a
/// gate scanner reads, alongside the human-readable confirmation code.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckInPass {
    pub confirmation_code: String,
    pub payload: String,
}

impl CheckInPass {
    pub fn new(booking_id: Uuid, confirmation_code: &str) -> Self {
        Self {
            confirmation_code: confirmation_code.to_string(),
            payload: format!("LT1:{}:{}", booking_id, confirmation_code),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("confirmation delivery failed: {0}")]
pub struct NotificationError(pub String);

/// Delivers the booking confirmation. Best-effort and post-commit.
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    async fn send_confirmation(
        &self,
        booking: &Booking,
        pass: &CheckInPass,
    ) -> Result<(), NotificationError>;
}

/// MVP sender: logs the delivery instead of talking to an SMTP relay.
pub struct LoggingEmailSender {
    from_address: String,
}

impl LoggingEmailSender {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl ConfirmationSender for LoggingEmailSender {
    async fn send_confirmation(
        &self,
        booking: &Booking,
        pass: &CheckInPass,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            "Booking confirmation {} sent to {} from {} (pass {})",
            booking.confirmation_code,
            booking.user_email,
            self.from_address,
            pass.payload
        );
        Ok(())
    }
}

/// Sender that always fails. Used to verify that delivery failure is a
/// warning, not a rollback.
pub struct FailingSender;

#[async_trait]
impl ConfirmationSender for FailingSender {
    async fn send_confirmation(
        &self,
        _booking: &Booking,
        _pass: &CheckInPass,
    ) -> Result<(), NotificationError> {
        Err(NotificationError("smtp relay unreachable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_payload_carries_booking_id_and_code() {
        let id = Uuid::new_v4();
        let pass = CheckInPass::new(id, "A1B2C3D4");
        assert_eq!(pass.confirmation_code, "A1B2C3D4");
        assert!(pass.payload.contains(&id.to_string()));
        assert!(pass.payload.ends_with("A1B2C3D4"));
    }
}
