// crates/safenet-server/src/submissions.rs
// ============================================================================
// Module: Submission Endpoints
// Description: JSON intake for quiz results and contact messages.
// Purpose: Normalize caller payloads and append them to the record store.
// Dependencies: axum, safenet-store-sqlite, serde, serde_json
// ============================================================================

//! ## Overview
//! Each endpoint parses the raw body, normalizes it in one function, and
//! appends one row inside a request-scoped session.
//!
//! Normalization rules:
//! - The body must be a JSON object.
//! - Absent and `null` fields take their default.
//! - Text fields keep strings verbatim and render numbers and booleans as
//!   their JSON text. Arrays and objects are rejected.
//! - `details` keeps strings verbatim and stores any other value as compact
//!   JSON text.
//! - Integer fields accept integers, finite floats (truncated toward zero),
//!   booleans (0/1), and trimmed base-10 integer strings with optional
//!   single underscores between digits.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use safenet_store_sqlite::DEFAULT_NAME;
use safenet_store_sqlite::NewContactMessage;
use safenet_store_sqlite::NewQuizResult;
use safenet_store_sqlite::RecordSession;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::server::AppState;
use crate::server::run_in_session;

/// Lower bound of `f64` values that truncate into `i64`.
const I64_FLOAT_MIN: f64 = -9_223_372_036_854_775_808.0;
/// Exclusive upper bound of `f64` values that truncate into `i64`.
const I64_FLOAT_MAX: f64 = 9_223_372_036_854_775_808.0;

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Success body of a submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Endpoint-specific confirmation.
    pub message: &'static str,
}

impl Acknowledgement {
    /// Acknowledges a stored quiz result.
    pub const QUIZ_SAVED: Self = Self {
        status: "ok",
        message: "Quiz saved",
    };
    /// Acknowledges a stored contact message.
    pub const CONTACT_SAVED: Self = Self {
        status: "ok",
        message: "Contact saved",
    };
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `POST /submit-quiz`.
///
/// # Errors
///
/// Returns [`ApiError`] for malformed or oversized bodies and store failures.
pub async fn submit_quiz(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let payload = parse_payload(&read_body(body)?)?;
    let record = normalize_quiz_submission(&payload)?;
    let id = run_in_session(&state.store, move |session: &mut RecordSession| {
        session.insert_quiz_result(&record)
    })
    .await?;
    info!(%id, "quiz result saved");
    Ok(Json(Acknowledgement::QUIZ_SAVED))
}

/// Handles `POST /contact`.
///
/// # Errors
///
/// Returns [`ApiError`] for malformed or oversized bodies and store failures.
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let payload = parse_payload(&read_body(body)?)?;
    let record = normalize_contact_submission(&payload)?;
    let id = run_in_session(&state.store, move |session: &mut RecordSession| {
        session.insert_contact_message(&record)
    })
    .await?;
    info!(%id, "contact message saved");
    Ok(Json(Acknowledgement::CONTACT_SAVED))
}

/// Maps a body extraction failure onto the request error taxonomy.
fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::MalformedPayload(rejection.body_text())
        }
    })
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Parses a request body into a JSON object.
///
/// # Errors
///
/// Returns [`ApiError::MalformedPayload`] for empty, non-JSON, or non-object
/// bodies.
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::MalformedPayload("request body is empty".to_string()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::MalformedPayload("request body must be a JSON object".to_string())),
        Err(err) => Err(ApiError::MalformedPayload(format!("invalid JSON: {err}"))),
    }
}

/// Applies defaults and coercions to a quiz payload.
///
/// # Errors
///
/// Returns [`ApiError::MalformedPayload`] when a field cannot be coerced.
pub fn normalize_quiz_submission(payload: &Map<String, Value>) -> Result<NewQuizResult, ApiError> {
    Ok(NewQuizResult {
        name: text_field(payload, "name", DEFAULT_NAME)?,
        score: integer_field(payload, "score")?,
        max_score: integer_field(payload, "max_score")?,
        details: blob_field(payload, "details"),
    })
}

/// Applies defaults and coercions to a contact payload.
///
/// # Errors
///
/// Returns [`ApiError::MalformedPayload`] when a field cannot be coerced.
pub fn normalize_contact_submission(
    payload: &Map<String, Value>,
) -> Result<NewContactMessage, ApiError> {
    Ok(NewContactMessage {
        name: text_field(payload, "name", DEFAULT_NAME)?,
        email: text_field(payload, "email", "")?,
        message: text_field(payload, "message", "")?,
    })
}

/// Returns a present, non-null field.
fn present<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|value| !value.is_null())
}

/// Reads a text field.
fn text_field(payload: &Map<String, Value>, key: &str, default: &str) -> Result<String, ApiError> {
    match present(payload, key) {
        None => Ok(default.to_string()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(_) => Err(ApiError::MalformedPayload(format!("{key} must be text"))),
    }
}

/// Reads an opaque blob field; non-string values are kept as compact JSON.
fn blob_field(payload: &Map<String, Value>, key: &str) -> String {
    match present(payload, key) {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Reads an integer field, defaulting to zero.
fn integer_field(payload: &Map<String, Value>, key: &str) -> Result<i64, ApiError> {
    let coerced = match present(payload, key) {
        None => Some(0),
        Some(Value::Number(number)) => number_to_i64(number),
        Some(Value::Bool(flag)) => Some(i64::from(*flag)),
        Some(Value::String(text)) => parse_integer_text(text),
        Some(_) => None,
    };
    coerced.ok_or_else(|| ApiError::MalformedPayload(format!("{key} must be an integer")))
}

/// Parses a base-10 integer string.
///
/// Surrounding whitespace is ignored and single underscores may separate
/// digits, so `" 1_000 "` reads as 1000. `"_1"`, `"1_"` and `"1__0"` are
/// rejected.
fn parse_integer_text(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    trimmed.replace('_', "").parse::<i64>().ok()
}

/// Converts a JSON number to `i64`, truncating finite floats toward zero.
#[allow(clippy::cast_possible_truncation, reason = "Range is checked before the cast.")]
fn number_to_i64(number: &Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    if number.is_u64() {
        return None;
    }
    let value = number.as_f64()?.trunc();
    if value.is_finite() && (I64_FLOAT_MIN..I64_FLOAT_MAX).contains(&value) {
        Some(value as i64)
    } else {
        None
    }
}
