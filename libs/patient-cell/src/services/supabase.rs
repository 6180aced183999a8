use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientError};
use crate::services::directory::PatientDirectory;

const PATIENTS_PATH: &str = "/rest/v1/patients";

/// Patient directory backed by the `patients` table.
pub struct SupabasePatientDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePatientDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn parse_row(row: Value) -> Result<Patient, PatientError> {
        serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl PatientDirectory for SupabasePatientDirectory {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Patient>, PatientError> {
        debug!("Looking up patient by phone number {}", phone_number);

        let path = format!(
            "{}?phone_number=eq.{}&select=id,name,phone_number&order=id.asc&limit=1",
            PATIENTS_PATH,
            urlencoding::encode(phone_number)
        );

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| {
                error!("Patient lookup failed: {}", e);
                PatientError::DatabaseError(e.to_string())
            })?;

        result.into_iter().next().map(Self::parse_row).transpose()
    }

    async fn find_or_create(&self, name: &str, phone_number: &str) -> Result<Patient, PatientError> {
        if let Some(existing) = self.find_by_phone(phone_number).await? {
            debug!("Reusing patient {} for phone number {}", existing.id, phone_number);
            return Ok(existing);
        }

        let patient_data = json!({
            "name": name,
            "phone_number": phone_number
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                &format!("{}?select=id,name,phone_number", PATIENTS_PATH),
                Some(patient_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| {
                error!("Patient creation failed: {}", e);
                PatientError::DatabaseError(e.to_string())
            })?;

        let patient = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::CreateFailed { phone_number: phone_number.to_string() })
            .and_then(Self::parse_row)?;

        info!("Registered patient {} ({})", patient.id, phone_number);
        Ok(patient)
    }
}
