use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use patient_cell::{Patient, PatientSummary};

use crate::models::{Appointment, AppointmentError};
use crate::services::lifecycle::SlotState;
use crate::services::store::AppointmentStore;

#[derive(Debug, Default)]
struct AppointmentTable {
    rows: HashMap<i64, Appointment>,
    // Unique index on starting_time; iteration order is chronological.
    by_start: BTreeMap<NaiveDateTime, i64>,
    last_id: i64,
}

impl AppointmentTable {
    fn ordered(&self) -> impl Iterator<Item = &Appointment> {
        self.by_start.values().filter_map(|id| self.rows.get(id))
    }
}

/// Process-local appointment store. Each mutation holds the write guard for
/// its whole check-then-write sequence.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    table: RwLock<AppointmentTable>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert_slots(&self, starts: &[NaiveDateTime]) -> Result<Vec<Appointment>, AppointmentError> {
        let mut table = self.table.write().await;

        if let Some(taken) = starts.iter().find(|start| table.by_start.contains_key(*start)) {
            warn!("Rejecting slot batch: {} already exists", taken);
            return Err(AppointmentError::SlotConflict { starting_time: *taken });
        }

        let mut created = Vec::with_capacity(starts.len());
        for start in starts {
            table.last_id += 1;
            let appointment = Appointment {
                id: table.last_id,
                starting_time: *start,
                patient: None,
            };
            table.by_start.insert(*start, appointment.id);
            table.rows.insert(appointment.id, appointment.clone());
            created.push(appointment);
        }

        created.sort_by_key(|a| a.starting_time);
        info!("Inserted {} appointment slots", created.len());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Appointment, AppointmentError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(AppointmentError::NotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.table.read().await.ordered().cloned().collect())
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        let table = self.table.read().await;
        Ok(table
            .ordered()
            .filter(|a| a.starting_time.date() == date)
            .cloned()
            .collect())
    }

    async fn list_by_patient_phone(&self, phone_number: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let table = self.table.read().await;
        Ok(table
            .ordered()
            .filter(|a| {
                a.patient
                    .as_ref()
                    .is_some_and(|p| p.phone_number == phone_number)
            })
            .cloned()
            .collect())
    }

    async fn assign_patient(&self, id: i64, patient: &Patient) -> Result<Appointment, AppointmentError> {
        let mut table = self.table.write().await;
        let appointment = table.rows.get_mut(&id).ok_or(AppointmentError::NotFound(id))?;

        SlotState::of(appointment).ensure_claimable(id)?;
        appointment.patient = Some(PatientSummary::from(patient));

        debug!("Appointment {} claimed by patient {}", id, patient.id);
        Ok(appointment.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppointmentError> {
        let mut table = self.table.write().await;
        let appointment = table.rows.get(&id).ok_or(AppointmentError::NotFound(id))?;

        SlotState::of(appointment).ensure_deletable(id)?;

        let starting_time = appointment.starting_time;
        table.rows.remove(&id);
        table.by_start.remove(&starting_time);

        info!("Deleted appointment {}", id);
        Ok(())
    }
}
