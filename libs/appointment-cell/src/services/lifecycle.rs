// libs/appointment-cell/src/services/lifecycle.rs
use tracing::warn;

use crate::models::{Appointment, AppointmentError};

/// Booking state of a slot. `Claimed` is terminal for the booking flow;
/// removal is only possible from `Unclaimed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unclaimed,
    Claimed,
}

impl SlotState {
    pub fn of(appointment: &Appointment) -> Self {
        if appointment.is_available() {
            SlotState::Unclaimed
        } else {
            SlotState::Claimed
        }
    }

    pub fn ensure_claimable(self, appointment_id: i64) -> Result<(), AppointmentError> {
        match self {
            SlotState::Unclaimed => Ok(()),
            SlotState::Claimed => {
                warn!("Appointment {} is already claimed", appointment_id);
                Err(AppointmentError::AlreadyClaimed(appointment_id))
            }
        }
    }

    pub fn ensure_deletable(self, appointment_id: i64) -> Result<(), AppointmentError> {
        match self {
            SlotState::Unclaimed => Ok(()),
            SlotState::Claimed => {
                warn!("Refusing to delete claimed appointment {}", appointment_id);
                Err(AppointmentError::SlotTaken(appointment_id))
            }
        }
    }
}
