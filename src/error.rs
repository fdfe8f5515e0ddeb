use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Failures talking to Airtable.
#[derive(Error, Debug)]
pub enum AirtableError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Airtable responded with status {status}")]
    Status { status: u16, body: String },

    #[error("Invalid Airtable URL: {0}")]
    Url(String),

    #[error("Server misconfigured (missing Airtable env vars)")]
    Misconfigured { missing: Vec<(&'static str, bool)> },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Errors returned by the `/api/*` handlers. Each variant maps to the JSON
/// body the front-end expects.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON body")]
    InvalidJson,

    /// Plain 400 with a route-specific message.
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Missing required fields")]
    MissingFields {
        required: &'static [&'static str],
        received: Value,
    },

    #[error("Server misconfigured (missing Airtable env vars)")]
    Misconfigured { missing: Vec<(&'static str, bool)> },

    #[error("Airtable request failed")]
    AirtableRequest,

    #[error("Airtable submit failed")]
    AirtableSubmit { status: u16, body: String },

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson | ApiError::BadRequest(_) | ApiError::MissingFields { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Misconfigured { .. }
            | ApiError::AirtableRequest
            | ApiError::AirtableSubmit { .. }
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let error = self.to_string();
        match self {
            ApiError::MissingFields { required, received } => json!({
                "error": error,
                "required": required,
                "received": received,
            }),
            ApiError::Misconfigured { missing } => {
                let missing: serde_json::Map<String, Value> = missing
                    .iter()
                    .map(|(key, absent)| (key.to_string(), Value::Bool(*absent)))
                    .collect();
                json!({ "error": error, "missing": missing })
            }
            ApiError::AirtableSubmit { status, body } => json!({
                "error": error,
                "airtableStatus": status,
                "airtableResponse": body,
            }),
            ApiError::Internal(details) => json!({ "error": error, "details": details }),
            _ => json!({ "error": error }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Lookups (list + match) surface any upstream failure as a bare
/// "Airtable request failed"; writes keep the upstream status and body.
/// The mark-used patch reports a rejection like a lookup, and a transport
/// failure like a write.
impl ApiError {
    pub fn from_lookup(err: AirtableError) -> Self {
        match err {
            AirtableError::Misconfigured { missing } => ApiError::Misconfigured { missing },
            _ => ApiError::AirtableRequest,
        }
    }

    pub fn from_patch(err: AirtableError) -> Self {
        match err {
            AirtableError::Misconfigured { missing } => ApiError::Misconfigured { missing },
            AirtableError::Status { .. } => ApiError::AirtableRequest,
            other => ApiError::Internal(other.to_string()),
        }
    }

    pub fn from_write(err: AirtableError) -> Self {
        match err {
            AirtableError::Misconfigured { missing } => ApiError::Misconfigured { missing },
            AirtableError::Status { status, body } => ApiError::AirtableSubmit { status, body },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AirtableError>;
