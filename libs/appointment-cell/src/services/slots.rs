use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::models::{slot_length, Appointment, AppointmentError};
use crate::services::store::AppointmentStore;
use crate::validation::TimeRange;

/// Start times of every whole slot inside `[start, end)`: `start`,
/// `start + 30m`, ... while the slot still ends at or before `end`.
pub fn slot_starts(range: &TimeRange) -> Vec<NaiveDateTime> {
    let step = slot_length();
    let mut starts = Vec::new();
    let mut current = range.start();

    // A slot whose end is not representable cannot fit in the window.
    while let Some(next) = current.checked_add_signed(step) {
        if next > range.end() {
            break;
        }
        starts.push(current);
        current = next;
    }

    starts
}

pub struct SlotGenerator {
    store: Arc<dyn AppointmentStore>,
}

impl SlotGenerator {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Creates the unclaimed slots covering `[start_time, end_time)` and
    /// returns them in chronological order. A window shorter than one slot
    /// yields nothing and touches no storage.
    pub async fn generate(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let range = TimeRange::new(start_time, end_time)?;
        self.generate_range(&range).await
    }

    pub async fn generate_range(&self, range: &TimeRange) -> Result<Vec<Appointment>, AppointmentError> {
        let starts = slot_starts(range);
        if starts.is_empty() {
            debug!("No whole slot fits between {} and {}", range.start(), range.end());
            return Ok(Vec::new());
        }

        let created = self.store.insert_slots(&starts).await?;
        info!("Generated {} slots between {} and {}", created.len(), range.start(), range.end());
        Ok(created)
    }
}
