use crate::bookings::BookingStatus;

/// Service for managing booking status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - PendingPayment → Confirmed, Cancelled
    /// - Confirmed → CheckedIn, Cancelled, Refunded
    /// - CheckedIn → Completed, Refunded
    /// - Completed, Cancelled, Refunded → (terminal)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        if from == to {
            return true;
        }

        match (from, to) {
            (BookingStatus::PendingPayment, BookingStatus::Confirmed) => true,
            (BookingStatus::PendingPayment, BookingStatus::Cancelled) => true,

            (BookingStatus::Confirmed, BookingStatus::CheckedIn) => true,
            (BookingStatus::Confirmed, BookingStatus::Cancelled) => true,
            (BookingStatus::Confirmed, BookingStatus::Refunded) => true,

            (BookingStatus::CheckedIn, BookingStatus::Completed) => true,
            (BookingStatus::CheckedIn, BookingStatus::Refunded) => true,

            // Terminal states
            (BookingStatus::Completed, _) => false,
            (BookingStatus::Cancelled, _) => false,
            (BookingStatus::Refunded, _) => false,

            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid status transition from {} to {}", from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_payment_to_confirmed() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::PendingPayment,
            BookingStatus::Confirmed
        ));
    }

    #[test]
    fn pending_payment_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::PendingPayment,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn pending_payment_cannot_skip_to_checked_in() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::PendingPayment,
            BookingStatus::CheckedIn
        ));
    }

    #[test]
    fn confirmed_to_checked_in() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn
        ));
    }

    #[test]
    fn confirmed_to_refunded() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Refunded
        ));
    }

    #[test]
    fn checked_in_to_completed() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::CheckedIn,
            BookingStatus::Completed
        ));
    }

    #[test]
    fn terminal_states_accept_no_transitions() {
        for terminal in [
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Refunded,
        ] {
            for target in [
                BookingStatus::PendingPayment,
                BookingStatus::Confirmed,
                BookingStatus::CheckedIn,
            ] {
                assert!(
                    !StatusMachine::is_valid_transition(terminal, target),
                    "{} -> {} should be invalid",
                    terminal,
                    target
                );
            }
        }
    }

    #[test]
    fn same_status_is_idempotent() {
        for status in [
            BookingStatus::PendingPayment,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Refunded,
        ] {
            assert!(StatusMachine::is_valid_transition(status, status));
        }
    }

    #[test]
    fn transition_returns_error_message() {
        let err = StatusMachine::transition(BookingStatus::Cancelled, BookingStatus::Confirmed)
            .unwrap_err();
        assert!(err.contains("cancelled"));
        assert!(err.contains("confirmed"));
    }
}
