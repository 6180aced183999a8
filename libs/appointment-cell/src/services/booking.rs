// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info};

use patient_cell::{InMemoryPatientDirectory, PatientDirectory, SupabasePatientDirectory};
use shared_config::{AppConfig, StorageBackend};
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, ClaimAppointmentRequest, GenerateSlotsRequest};
use crate::services::lifecycle::SlotState;
use crate::services::memory::InMemoryAppointmentStore;
use crate::services::slots::SlotGenerator;
use crate::services::store::AppointmentStore;
use crate::services::supabase::SupabaseAppointmentStore;
use crate::timestamp::parse_date;
use crate::validation::{validate_claim, validate_time_range};

/// Entry point for every booking operation.
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    patients: Arc<dyn PatientDirectory>,
    slot_generator: SlotGenerator,
}

impl BookingService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, patients: Arc<dyn PatientDirectory>) -> Self {
        let slot_generator = SlotGenerator::new(Arc::clone(&appointments));

        Self {
            appointments,
            patients,
            slot_generator,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryAppointmentStore::new()),
            Arc::new(InMemoryPatientDirectory::new()),
        )
    }

    /// Wires the stores selected by `config.storage_backend`.
    pub fn from_config(config: &AppConfig) -> Self {
        match config.storage_backend {
            StorageBackend::Memory => {
                info!("Using in-memory appointment storage");
                Self::in_memory()
            }
            StorageBackend::Supabase => {
                info!("Using Supabase appointment storage at {}", config.supabase_url);
                let supabase = Arc::new(SupabaseClient::new(config));
                Self::new(
                    Arc::new(SupabaseAppointmentStore::with_client(Arc::clone(&supabase))),
                    Arc::new(SupabasePatientDirectory::with_client(supabase)),
                )
            }
        }
    }

    pub fn slot_generator(&self) -> &SlotGenerator {
        &self.slot_generator
    }

    /// Validates the requested window and creates its slots.
    pub async fn generate_slots(&self, request: &GenerateSlotsRequest) -> Result<Vec<Appointment>, AppointmentError> {
        let range = validate_time_range(request)?;
        self.slot_generator.generate_range(&range).await
    }

    /// Attaches a patient to an unclaimed appointment.
    pub async fn claim(&self, request: &ClaimAppointmentRequest) -> Result<Appointment, AppointmentError> {
        // **Step 1: Input validation**
        let command = validate_claim(request)?;
        info!("Claiming appointment {} for {}", command.appointment_id, command.patient_phone_number);

        // **Step 2: Resolve the appointment**
        let appointment = self.appointments.get_by_id(command.appointment_id).await?;

        // **Step 3: Early rejection of already claimed slots**
        SlotState::of(&appointment).ensure_claimable(appointment.id)?;

        // **Step 4: Resolve or register the patient**
        let patient = self.patients
            .find_or_create(&command.patient_name, &command.patient_phone_number)
            .await?;

        // **Step 5: Compare-and-set the patient reference**
        let claimed = self.appointments.assign_patient(appointment.id, &patient).await?;

        info!("Appointment {} claimed by patient {}", claimed.id, patient.id);
        Ok(claimed)
    }

    /// Removes an unclaimed appointment.
    pub async fn cancel(&self, appointment_id: i64) -> Result<(), AppointmentError> {
        info!("Cancelling appointment {}", appointment_id);
        self.appointments.delete(appointment_id).await
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        self.appointments.get_by_id(appointment_id).await
    }

    /// Unclaimed appointments on `date`. A value that is not a calendar date
    /// matches nothing.
    pub async fn list_available_for_date(&self, date: &str) -> Result<Vec<Appointment>, AppointmentError> {
        match parse_date(date) {
            Some(day) => self.appointments.list_available_by_date(day).await,
            None => {
                debug!("'{}' is not a calendar date, no appointments match", date);
                Ok(Vec::new())
            }
        }
    }

    pub async fn list_for_patient(&self, phone_number: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.appointments.list_by_patient_phone(phone_number).await
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.appointments.list_all().await
    }
}
