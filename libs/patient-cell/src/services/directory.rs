use async_trait::async_trait;

use crate::models::{Patient, PatientError};

/// Storage port for patient identity records.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Looks a patient up by phone number. When several records share the
    /// number, the oldest one wins.
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Patient>, PatientError>;

    /// Returns the patient registered under `phone_number`, creating it with
    /// `name` if none exists. An existing record is returned unchanged even if
    /// `name` differs.
    async fn find_or_create(&self, name: &str, phone_number: &str) -> Result<Patient, PatientError>;
}
