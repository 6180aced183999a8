use serde::{Deserialize, Serialize};

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_PHONE_NUMBER_LEN: usize = 16;

/// A patient identity record. The phone number is the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
}

/// The patient fields exposed alongside an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub name: String,
    pub phone_number: String,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            phone_number: patient.phone_number.clone(),
        }
    }
}

impl From<Patient> for PatientSummary {
    fn from(patient: Patient) -> Self {
        Self {
            name: patient.name,
            phone_number: patient.phone_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatientError {
    #[error("Patient record could not be created for {phone_number}")]
    CreateFailed { phone_number: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
