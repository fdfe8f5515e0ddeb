#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use roamsix::config::{AirtableConfig, TableConfig};

pub const CODES_TABLE: &str = "Invitation Codes";
pub const APPLICATIONS_TABLE: &str = "tblApplications";
pub const INTERESTS_TABLE: &str = "tblInterests";
pub const TOKEN: &str = "patTest";

/// A request the fake received.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub table: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub query: Option<String>,
    pub body: Value,
}

/// Just enough of Airtable's REST surface for the service.
#[derive(Debug)]
pub struct FakeAirtable {
    pub codes: Vec<Value>,
    pub page_size: usize,
    pub fail_status: Option<u16>,
    pub non_json_success: bool,
    pub requests: Vec<Captured>,
}

impl Default for FakeAirtable {
    fn default() -> Self {
        Self {
            codes: Vec::new(),
            page_size: 100,
            fail_status: None,
            non_json_success: false,
            requests: Vec::new(),
        }
    }
}

pub type SharedFake = Arc<Mutex<FakeAirtable>>;

impl FakeAirtable {
    pub fn with_codes(codes: &[(&str, &str, &str, Option<&str>)]) -> Self {
        let codes = codes
            .iter()
            .map(|(id, code, status, pathway)| {
                let mut fields = json!({ "CODE": code, "Status": status });
                if let Some(p) = pathway {
                    fields["Pathway"] = json!(p);
                }
                json!({ "id": id, "createdTime": "2025-01-01T00:00:00.000Z", "fields": fields })
            })
            .collect();
        Self {
            codes,
            ..Default::default()
        }
    }
}

async fn handle(
    State(fake): State<SharedFake>,
    method: Method,
    Path((_base, table)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let mut fake = fake.lock().unwrap();
    fake.requests.push(Captured {
        method: method.clone(),
        table: table.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        query: uri.query().map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    if let Some(status) = fake.fail_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, r#"{"error":{"type":"INVALID_PERMISSIONS"}}"#).into_response();
    }

    match method {
        Method::GET => {
            let start: usize = uri
                .query()
                .and_then(|q| q.strip_prefix("offset="))
                .and_then(|o| o.parse().ok())
                .unwrap_or(0);
            let end = (start + fake.page_size).min(fake.codes.len());
            let records = fake.codes[start.min(end)..end].to_vec();
            let mut page = json!({ "records": records });
            if end < fake.codes.len() {
                page["offset"] = json!(end.to_string());
            }
            axum::Json(page).into_response()
        }
        Method::POST if fake.non_json_success => (StatusCode::OK, "OK").into_response(),
        Method::POST => {
            let created = fake
                .requests
                .iter()
                .filter(|r| r.method == Method::POST)
                .count();
            let fields = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|b| b.pointer("/records/0/fields").cloned())
                .unwrap_or(Value::Null);
            axum::Json(json!({
                "records": [{ "id": format!("recCreated{created}"), "fields": fields }]
            }))
            .into_response()
        }
        Method::PATCH => axum::Json(json!({ "records": [] })).into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

/// Serve `router` on an ephemeral local port; returns its base URL.
pub fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(router.into_make_service())
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

/// Start a fake Airtable; returns its shared state and base URL.
pub fn spawn_fake(fake: FakeAirtable) -> (SharedFake, String) {
    let shared = Arc::new(Mutex::new(fake));
    let router = Router::new()
        .route("/v0/:base/:table", any(handle))
        .with_state(shared.clone());
    (shared, spawn(router))
}

pub fn airtable_config(api_url: &str) -> AirtableConfig {
    AirtableConfig {
        api_url: api_url.to_string(),
        base_id: Some("appTest".to_string()),
        token: Some(TOKEN.to_string()),
        tables: TableConfig {
            codes: Some(CODES_TABLE.to_string()),
            applications: Some(APPLICATIONS_TABLE.to_string()),
            interests: Some(INTERESTS_TABLE.to_string()),
        },
    }
}

/// Send one request through `app`; returns status and JSON body (Null when
/// the body is not JSON).
pub async fn call(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Like `call`, but returns the body as text.
pub async fn call_text(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, bytes)
}
