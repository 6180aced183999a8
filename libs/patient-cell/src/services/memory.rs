use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{Patient, PatientError};
use crate::services::directory::PatientDirectory;

#[derive(Debug, Default)]
struct PatientTable {
    rows: Vec<Patient>,
    last_id: i64,
}

/// Process-local patient directory.
#[derive(Debug, Default)]
pub struct InMemoryPatientDirectory {
    table: RwLock<PatientTable>,
}

impl InMemoryPatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Patient>, PatientError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|p| p.phone_number == phone_number).cloned())
    }

    async fn find_or_create(&self, name: &str, phone_number: &str) -> Result<Patient, PatientError> {
        // Lookup and insert share one write guard so two callers with the same
        // new number cannot both insert.
        let mut table = self.table.write().await;

        if let Some(existing) = table.rows.iter().find(|p| p.phone_number == phone_number) {
            debug!("Reusing patient {} for phone number {}", existing.id, phone_number);
            return Ok(existing.clone());
        }

        table.last_id += 1;
        let patient = Patient {
            id: table.last_id,
            name: name.to_string(),
            phone_number: phone_number.to_string(),
        };
        table.rows.push(patient.clone());

        info!("Registered patient {} ({})", patient.id, phone_number);
        Ok(patient)
    }
}
