// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use shared_models::error::AppError;

use crate::models::{Appointment, ClaimAppointmentRequest, GenerateSlotsRequest};
use crate::services::booking::BookingService;
use crate::validation::ValidationError;

// JSON rejections become 400s carrying the validation message.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            AppError::ValidationError(ValidationError::MalformedBody(rejection.body_text()).to_string())
        })
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<BookingService>>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = service.list_all().await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn generate_slots(
    State(service): State<Arc<BookingService>>,
    payload: Result<Json<GenerateSlotsRequest>, JsonRejection>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let request = json_body(payload)?;
    let appointments = service.generate_slots(&request).await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(service): State<Arc<BookingService>>,
    appointment_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    // A non-numeric id cannot name an appointment.
    let Path(appointment_id) = appointment_id
        .map_err(|_| AppError::NotFound("appointment doesn't exist".to_string()))?;

    service.cancel(appointment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==============================================================================
// LISTING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_available_appointments(
    State(service): State<Arc<BookingService>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = service.list_available_for_date(&date).await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn list_patient_appointments(
    State(service): State<Arc<BookingService>>,
    Path(phone_number): Path<String>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = service.list_for_patient(&phone_number).await?;
    Ok(Json(appointments))
}

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn claim_appointment(
    State(service): State<Arc<BookingService>>,
    payload: Result<Json<ClaimAppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    let request = json_body(payload)?;
    let appointment = service.claim(&request).await?;
    Ok(Json(appointment))
}
