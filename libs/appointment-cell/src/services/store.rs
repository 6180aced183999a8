use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use patient_cell::Patient;

use crate::models::{Appointment, AppointmentError};

/// Storage port for appointment slots.
///
/// Implementations must make `insert_slots`, `assign_patient` and `delete`
/// atomic: a rejected call leaves the store untouched.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Persists one unclaimed appointment per start time, all or nothing.
    /// Fails with `SlotConflict` if any start time is already taken.
    async fn insert_slots(&self, starts: &[NaiveDateTime]) -> Result<Vec<Appointment>, AppointmentError>;

    async fn get_by_id(&self, id: i64) -> Result<Appointment, AppointmentError>;

    /// Every appointment, ordered by `starting_time`.
    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError>;

    /// Claimed and unclaimed appointments starting on `date`.
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError>;

    /// Unclaimed appointments starting on `date`.
    async fn list_available_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.list_by_date(date).await?;
        appointments.retain(Appointment::is_available);
        Ok(appointments)
    }

    async fn list_by_patient_phone(&self, phone_number: &str) -> Result<Vec<Appointment>, AppointmentError>;

    /// Compare-and-set claim: attaches `patient` only if the slot is still
    /// unclaimed, otherwise fails with `AlreadyClaimed`.
    async fn assign_patient(&self, id: i64, patient: &Patient) -> Result<Appointment, AppointmentError>;

    /// Removes an unclaimed slot. `NotFound` for unknown ids, `SlotTaken` for
    /// claimed ones.
    async fn delete(&self, id: i64) -> Result<(), AppointmentError>;
}
