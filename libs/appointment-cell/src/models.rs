// libs/appointment-cell/src/models.rs
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use patient_cell::{PatientError, PatientSummary};
use shared_models::error::AppError;

use crate::validation::ValidationError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Every slot is exactly this long.
pub const SLOT_MINUTES: i64 = 30;

/// Upper bound on the slots one generation request may create.
pub const MAX_SLOTS_PER_WINDOW: i64 = 10_000;

pub fn slot_length() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// A half-hour slot. `patient == None` means the slot is still available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    #[serde(with = "crate::timestamp::wire_format")]
    pub starting_time: NaiveDateTime,
    pub patient: Option<PatientSummary>,
}

impl Appointment {
    pub fn is_available(&self) -> bool {
        self.patient.is_none()
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Body of a slot generation request. Fields stay optional so that missing
/// values are reported by validation instead of by the JSON extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateSlotsRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_phone_number: Option<String>,
    /// Accepted as a JSON integer or a numeric string.
    pub appointment_id: Option<Value>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("appointment doesn't exist")]
    NotFound(i64),

    #[error("this time slot is already taken by a patient")]
    AlreadyClaimed(i64),

    #[error("this time slot is taken by a patient")]
    SlotTaken(i64),

    #[error("a slot already exists at {}", crate::timestamp::format_timestamp(.starting_time))]
    SlotConflict { starting_time: NaiveDateTime },

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::Validation(_) => AppError::ValidationError(message),
            AppointmentError::NotFound(_) => AppError::NotFound(message),
            AppointmentError::AlreadyClaimed(_) => AppError::Conflict(message),
            AppointmentError::SlotConflict { .. } => AppError::Conflict(message),
            AppointmentError::SlotTaken(_) => AppError::NotAcceptable(message),
            AppointmentError::Patient(_) => AppError::Database(message),
            AppointmentError::DatabaseError(_) => AppError::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;
    use serde_json::json;

    fn slot() -> Appointment {
        Appointment {
            id: 1,
            starting_time: NaiveDate::from_ymd_opt(2022, 6, 5)
                .unwrap()
                .and_hms_opt(17, 30, 0)
                .unwrap(),
            patient: None,
        }
    }

    #[test]
    fn serializes_to_wire_shape() {
        let mut appointment = slot();
        assert_eq!(
            serde_json::to_value(&appointment).unwrap(),
            json!({"id": 1, "starting_time": "2022-06-05T17:30:00", "patient": null})
        );

        appointment.patient = Some(PatientSummary {
            name: "Kevin".into(),
            phone_number: "123".into(),
        });
        let value = serde_json::to_value(&appointment).unwrap();
        assert_eq!(value["patient"], json!({"name": "Kevin", "phone_number": "123"}));
    }

    #[test]
    fn deserializes_postgrest_rows() {
        let row = json!({"id": 4, "starting_time": "2022-06-05 17:30:00", "patient": null});
        let appointment: Appointment = serde_json::from_value(row).unwrap();
        assert_eq!(appointment, Appointment { id: 4, ..slot() });
        assert!(appointment.is_available());
    }

    #[test]
    fn maps_errors_to_http_statuses() {
        let cases = [
            (AppointmentError::from(ValidationError::StartAfterEnd), StatusCode::BAD_REQUEST),
            (AppointmentError::NotFound(9), StatusCode::NOT_FOUND),
            (AppointmentError::AlreadyClaimed(1), StatusCode::CONFLICT),
            (AppointmentError::SlotTaken(1), StatusCode::NOT_ACCEPTABLE),
            (
                AppointmentError::SlotConflict { starting_time: slot().starting_time },
                StatusCode::CONFLICT,
            ),
            (AppointmentError::DatabaseError("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn conflict_message_names_the_slot() {
        let err = AppointmentError::SlotConflict { starting_time: slot().starting_time };
        assert_eq!(err.to_string(), "a slot already exists at 2022-06-05T17:30:00");
    }
}
