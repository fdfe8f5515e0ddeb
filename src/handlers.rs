use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::app::applications::{self, ApplicationForm};
use crate::app::{codes, interests};
use crate::error::ApiError;
use crate::metrics;
use crate::models::{CodeValidation, SubmissionReceipt};
use crate::state::AppState;
use crate::types::CreateOutcome;
use crate::wizard::PATHWAYS;

const APPLICATION_REQUIRED: &[&str] = &["formData", "pathway", "invitationCode"];

/// Parse a request body regardless of its content type. Empty bodies are an
/// empty object; a JSON string holding JSON is unwrapped once.
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    match value {
        Value::String(inner) => serde_json::from_str(&inner).map_err(|_| ApiError::InvalidJson),
        other => Ok(other),
    }
}

/// JavaScript-style truthiness.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Scalar rendered as text; strings verbatim, null/absent empty.
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn receipt(outcome: CreateOutcome) -> SubmissionReceipt {
    match outcome {
        CreateOutcome::Created { record_id } => SubmissionReceipt {
            record_id,
            ..SubmissionReceipt::ok()
        },
        CreateOutcome::NonJsonSuccess { raw } => SubmissionReceipt {
            note: Some("Airtable returned a non-JSON success response".to_string()),
            raw: Some(raw),
            ..SubmissionReceipt::ok()
        },
    }
}

pub async fn validate_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CodeValidation>, ApiError> {
    let payload = parse_body(&body)?;

    // `CODE` first, then `code`; null falls through like `??`
    let raw = payload
        .get("CODE")
        .filter(|v| !v.is_null())
        .or_else(|| payload.get("code"));
    let code = text(raw).trim().to_string();
    if code.is_empty() {
        return Err(ApiError::BadRequest("CODE is required"));
    }

    let check = codes::validate_code(state.store.as_ref(), &code)
        .await
        .map_err(ApiError::from_lookup)?;
    metrics::record_code_check(check.is_valid());

    Ok(Json(match check {
        codes::CodeCheck::Valid { pathway, record_id } => CodeValidation {
            valid: true,
            pathway,
            record_id: Some(record_id),
        },
        codes::CodeCheck::Invalid => CodeValidation::default(),
    }))
}

pub async fn mark_code_used(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let payload = parse_body(&body)?;
    let record_id = payload.get("recordId");
    let email = payload.get("email");
    if !is_truthy(record_id) || !is_truthy(email) {
        return Err(ApiError::BadRequest("RecordId and email are required"));
    }

    codes::mark_code_used(
        state.store.as_ref(),
        &text(record_id),
        &text(email),
        Utc::now().date_naive(),
    )
    .await
    .map_err(ApiError::from_patch)?;

    Ok(Json(SubmissionReceipt::ok()))
}

pub async fn submit_application(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let payload = parse_body(&body)?;
    let form_data = payload.get("formData");
    let pathway = payload.get("pathway");
    let invitation_code = payload.get("invitationCode");

    if !is_truthy(form_data) || !is_truthy(pathway) || !is_truthy(invitation_code) {
        warn!("Application rejected: missing required fields");
        return Err(ApiError::MissingFields {
            required: APPLICATION_REQUIRED,
            received: payload,
        });
    }

    let form = form_data.map(ApplicationForm::from_value).unwrap_or_default();
    let pathway = text(pathway);
    let outcome = applications::submit_application(
        state.store.as_ref(),
        &form,
        &pathway,
        &text(invitation_code),
    )
    .await
    .map_err(ApiError::from_write)?;

    metrics::record_application(metrics::pathway_label(&pathway));
    Ok(Json(receipt(outcome)))
}

pub async fn submit_interests(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let payload = parse_body(&body)?;
    let email = payload.get("email");
    let Some(Value::Array(items)) = payload.get("interests") else {
        return Err(ApiError::BadRequest("Email and interests are required"));
    };
    if !is_truthy(email) {
        return Err(ApiError::BadRequest("Email and interests are required"));
    }

    let Some(chosen) = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()
    else {
        return Err(ApiError::BadRequest("Email and interests are required"));
    };
    let full_name = text(payload.get("fullName"));
    let outcome = interests::submit_interests(
        state.store.as_ref(),
        &text(email),
        Some(full_name.as_str()).filter(|n| !n.is_empty()),
        &chosen,
    )
    .await
    .map_err(ApiError::from_write)?;

    metrics::record_interests();
    Ok(Json(receipt(outcome)))
}

/// Pathway and interest catalog for the front-end.
pub async fn pathways() -> impl IntoResponse {
    Json(json!({
        "pathways": PATHWAYS,
        "interests": interests::INTEREST_OPTIONS,
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "roamsix",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics_text() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

/// Per-request span with a fresh request id, plus the request counter.
pub async fn track_request(request: Request<Body>, next: Next<Body>) -> Response {
    let request_id = Uuid::new_v4();
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let span = tracing::info_span!("api", %request_id, %method, path = %path);

    async move {
        let response = next.run(request).await;
        let status = response.status().as_u16();
        info!(status, "Handled request");
        metrics::record_request(&path, status);
        response
    }
    .instrument(span)
    .await
}
