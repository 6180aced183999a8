use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use patient_cell::Patient;
use shared_config::AppConfig;
use shared_database::supabase::{error_status, SupabaseClient};

use crate::models::{Appointment, AppointmentError};
use crate::services::lifecycle::SlotState;
use crate::services::store::AppointmentStore;
use crate::timestamp::format_timestamp;

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Columns of an appointment with its patient embedded through the
/// `appointments.patient_id -> patients.id` foreign key.
const SELECT_COLUMNS: &str = "id,starting_time,patient:patients(name,phone_number)";

/// Appointment store backed by the `appointments` table.
///
/// Mutations are expressed as single conditional statements so PostgREST runs
/// each of them in one transaction.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn encode_time(value: &NaiveDateTime) -> String {
        urlencoding::encode(&format_timestamp(value)).into_owned()
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("unexpected appointment row: {}", e)))
    }

    fn database_error(context: &str, err: anyhow::Error) -> AppointmentError {
        error!("{}: {}", context, err);
        AppointmentError::DatabaseError(err.to_string())
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("{}?select={}&{}", APPOINTMENTS_PATH, SELECT_COLUMNS, query);
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| Self::database_error("Appointment query failed", e))?;
        Self::parse_rows(rows)
    }

    /// Finds which requested start time collided after a rejected batch.
    async fn first_taken_start(&self, starts: &[NaiveDateTime]) -> Option<NaiveDateTime> {
        let first = *starts.iter().min()?;
        let last = *starts.iter().max()?;

        let query = format!(
            "starting_time=gte.{}&starting_time=lte.{}&order=starting_time.asc",
            Self::encode_time(&first),
            Self::encode_time(&last)
        );

        let existing = self.fetch(&query).await.ok()?;
        starts
            .iter()
            .copied()
            .find(|start| existing.iter().any(|a| a.starting_time == *start))
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert_slots(&self, starts: &[NaiveDateTime]) -> Result<Vec<Appointment>, AppointmentError> {
        if starts.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Value> = starts
            .iter()
            .map(|start| json!({ "starting_time": format_timestamp(start) }))
            .collect();

        // One POST of the whole array is a single INSERT: all rows or none.
        let result = self.supabase
            .request_with_headers::<Vec<Value>>(
                Method::POST,
                &format!("{}?select={}", APPOINTMENTS_PATH, SELECT_COLUMNS),
                Some(Value::Array(rows)),
                Some(SupabaseClient::representation_headers()),
            )
            .await;

        let created = match result {
            Ok(rows) => rows,
            Err(e) if error_status(&e) == Some(StatusCode::CONFLICT) => {
                let starting_time = self.first_taken_start(starts).await.unwrap_or(starts[0]);
                warn!("Rejecting slot batch: {} already exists", format_timestamp(&starting_time));
                return Err(AppointmentError::SlotConflict { starting_time });
            }
            Err(e) => return Err(Self::database_error("Slot insert failed", e)),
        };

        let mut created = Self::parse_rows(created)?;
        created.sort_by_key(|a| a.starting_time);

        info!("Inserted {} appointment slots", created.len());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", id);

        self.fetch(&format!("id=eq.{}", id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.fetch("order=starting_time.asc").await
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        self.fetch(&day_window(date)).await
    }

    async fn list_available_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        self.fetch(&format!("{}&patient_id=is.null", day_window(date))).await
    }

    async fn list_by_patient_phone(&self, phone_number: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "{}?select=id,starting_time,patient:patients!inner(name,phone_number)&patient.phone_number=eq.{}&order=starting_time.asc",
            APPOINTMENTS_PATH,
            urlencoding::encode(phone_number)
        );

        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| Self::database_error("Patient appointment query failed", e))?;

        Self::parse_rows(rows)
    }

    async fn assign_patient(&self, id: i64, patient: &Patient) -> Result<Appointment, AppointmentError> {
        // The `patient_id=is.null` filter makes the update a compare-and-set.
        let path = format!(
            "{}?id=eq.{}&patient_id=is.null&select={}",
            APPOINTMENTS_PATH, id, SELECT_COLUMNS
        );

        let rows: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "patient_id": patient.id })),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| Self::database_error("Appointment claim failed", e))?;

        if let Some(claimed) = Self::parse_rows(rows)?.into_iter().next() {
            debug!("Appointment {} claimed by patient {}", id, patient.id);
            return Ok(claimed);
        }

        // Nothing matched: the slot is gone or somebody else got it first.
        let current = self.get_by_id(id).await?;
        SlotState::of(&current).ensure_claimable(id)?;
        Err(AppointmentError::DatabaseError(format!("claim of appointment {} was not applied", id)))
    }

    async fn delete(&self, id: i64) -> Result<(), AppointmentError> {
        let path = format!("{}?id=eq.{}&patient_id=is.null", APPOINTMENTS_PATH, id);

        // Only unclaimed rows match, so a claimed slot is never removed here.
        let deleted: Vec<Value> = self.supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| Self::database_error("Appointment delete failed", e))?;

        if !deleted.is_empty() {
            info!("Deleted appointment {}", id);
            return Ok(());
        }

        let current = self.get_by_id(id).await?;
        SlotState::of(&current).ensure_deletable(id)?;
        Err(AppointmentError::DatabaseError(format!("delete of appointment {} was not applied", id)))
    }
}

fn day_window(date: NaiveDate) -> String {
    let start = date.and_time(NaiveTime::MIN);
    let end = date
        .succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX);

    format!(
        "starting_time=gte.{}&starting_time=lt.{}&order=starting_time.asc",
        SupabaseAppointmentStore::encode_time(&start),
        SupabaseAppointmentStore::encode_time(&end)
    )
}
