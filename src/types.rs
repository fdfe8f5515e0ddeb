use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants;

/// Airtable column name → value.
pub type Fields = Map<String, Value>;

/// A single Airtable row as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl Record {
    /// Field rendered as trimmed text. Non-string scalars use their JSON text;
    /// absent or null fields are empty.
    pub fn text(&self, field: &str) -> String {
        match self.fields.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string().trim().to_string(),
        }
    }
}

/// One page of `GET /v0/{base}/{table}`.
#[derive(Debug, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    pub offset: Option<String>,
}

/// What a successful create returned.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created { record_id: Option<String> },
    /// 2xx whose body could not be parsed as JSON.
    NonJsonSuccess { raw: String },
}

/// The three tables the service writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Codes,
    Applications,
    Interests,
}

impl Table {
    pub fn env_key(self) -> &'static str {
        match self {
            Table::Codes => constants::ENV_AIRTABLE_TABLE_CODES,
            Table::Applications => constants::ENV_AIRTABLE_TABLE_APPLICATIONS,
            Table::Interests => constants::ENV_AIRTABLE_TABLE_INTERESTS,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Codes => "codes",
            Table::Applications => "applications",
            Table::Interests => "interests",
        };
        f.write_str(name)
    }
}
