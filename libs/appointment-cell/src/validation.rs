//! Request validation, run before any storage access.

use chrono::NaiveDateTime;
use serde_json::Value;

use patient_cell::{MAX_NAME_LEN, MAX_PHONE_NUMBER_LEN};

use crate::models::{slot_length, ClaimAppointmentRequest, GenerateSlotsRequest, MAX_SLOTS_PER_WINDOW};
use crate::timestamp::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0}: This field is required.")]
    MissingField(&'static str),

    #[error("{0}: This field may not be blank.")]
    BlankField(&'static str),

    #[error("{field}: Ensure this field has no more than {max} characters.")]
    TooLong { field: &'static str, max: usize },

    #[error("{field}: A valid integer is required.")]
    InvalidInteger { field: &'static str },

    #[error("{field}: invalid timestamp '{value}', expected YYYY-MM-DDTHH:MM:SS")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("end time must occur after start time")]
    StartAfterEnd,

    #[error("a single request may generate at most {max} slots")]
    WindowTooLarge { max: i64 },

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// A validated generation window: `start <= end`, and no longer than
/// `MAX_SLOTS_PER_WINDOW` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::StartAfterEnd);
        }

        let slots = end.signed_duration_since(start).num_minutes() / slot_length().num_minutes();
        if slots > MAX_SLOTS_PER_WINDOW {
            return Err(ValidationError::WindowTooLarge { max: MAX_SLOTS_PER_WINDOW });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// A validated claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCommand {
    pub patient_name: String,
    pub patient_phone_number: String,
    pub appointment_id: i64,
}

pub fn validate_time_range(request: &GenerateSlotsRequest) -> Result<TimeRange, ValidationError> {
    let start = required_timestamp("start_time", request.start_time.as_deref())?;
    let end = required_timestamp("end_time", request.end_time.as_deref())?;
    TimeRange::new(start, end)
}

pub fn validate_claim(request: &ClaimAppointmentRequest) -> Result<ClaimCommand, ValidationError> {
    let patient_name = required_text("patient_name", request.patient_name.as_deref(), MAX_NAME_LEN)?;
    let patient_phone_number = required_text(
        "patient_phone_number",
        request.patient_phone_number.as_deref(),
        MAX_PHONE_NUMBER_LEN,
    )?;
    let appointment_id = required_integer("appointment_id", request.appointment_id.as_ref())?;

    Ok(ClaimCommand {
        patient_name,
        patient_phone_number,
        appointment_id,
    })
}

fn required_text(field: &'static str, value: Option<&str>, max: usize) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?.trim();

    if value.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }

    Ok(value.to_string())
}

fn required_integer(field: &'static str, value: Option<&Value>) -> Result<i64, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral))
            .ok_or(ValidationError::InvalidInteger { field }),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) => {
            // "3" and "3.0" are both the integer 3.
            let s = s.trim();
            let digits = match s.split_once('.') {
                Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
                _ => s,
            };
            digits.parse().map_err(|_| ValidationError::InvalidInteger { field })
        }
        Some(_) => Err(ValidationError::InvalidInteger { field }),
    }
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn required_timestamp(field: &'static str, value: Option<&str>) -> Result<NaiveDateTime, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }

    parse_timestamp(value).ok_or_else(|| ValidationError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}
