use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::app::ports::RecordStore;
use crate::constants::APPLICATION_STATUS_UNDER_REVIEW;
use crate::error::Result;
use crate::types::{CreateOutcome, Fields, Table};

/// Application form as the front-end posts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub team_size: Option<String>,
    pub website: Option<String>,
    pub organization_name: Option<String>,
    pub sport: Option<String>,
    pub participants: Option<String>,
    pub relationship: Option<String>,
    pub transition: Option<String>,
    pub why_now: Option<String>,
}

impl ApplicationForm {
    /// Value of a form field by its camelCase key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "fullName" => &self.full_name,
            "email" => &self.email,
            "phone" => &self.phone,
            "location" => &self.location,
            "linkedin" => &self.linkedin,
            "address" => &self.address,
            "company" => &self.company,
            "role" => &self.role,
            "teamSize" => &self.team_size,
            "website" => &self.website,
            "organizationName" => &self.organization_name,
            "sport" => &self.sport,
            "participants" => &self.participants,
            "relationship" => &self.relationship,
            "transition" => &self.transition,
            "whyNow" => &self.why_now,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Lenient build from arbitrary JSON: string values are taken as-is,
    /// other scalars use their JSON text, anything else is ignored.
    pub fn from_value(value: &Value) -> Self {
        let mut form = ApplicationForm::default();
        if let Value::Object(map) = value {
            for (key, value) in map {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                form.set(key, text);
            }
        }
        form
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            "fullName" => &mut self.full_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "location" => &mut self.location,
            "linkedin" => &mut self.linkedin,
            "address" => &mut self.address,
            "company" => &mut self.company,
            "role" => &mut self.role,
            "teamSize" => &mut self.team_size,
            "website" => &mut self.website,
            "organizationName" => &mut self.organization_name,
            "sport" => &mut self.sport,
            "participants" => &mut self.participants,
            "relationship" => &mut self.relationship,
            "transition" => &mut self.transition,
            "whyNow" => &mut self.why_now,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }
}

/// Always written, empty string when the form left them blank.
const BASE_FIELDS: &[(&str, &str)] = &[
    ("Full Name", "fullName"),
    ("Email", "email"),
    ("Phone", "phone"),
    ("Location", "location"),
    ("Linkedin", "linkedin"),
    ("Mailing Address", "address"),
    ("Transition Question", "transition"),
    ("Why Now Question", "whyNow"),
];

/// Written only when non-empty.
const OPTIONAL_FIELDS: &[(&str, &str)] = &[
    ("Role", "role"),
    ("Company", "company"),
    ("Team Size", "teamSize"),
    ("Website", "website"),
    ("Organization Name", "organizationName"),
    ("Sport", "sport"),
    ("Participants", "participants"),
    ("Relationship", "relationship"),
];

/// The four application tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pathway {
    Individual,
    Corporate,
    Athletics,
    Family,
}

impl Pathway {
    pub const ALL: [Pathway; 4] = [
        Pathway::Individual,
        Pathway::Corporate,
        Pathway::Athletics,
        Pathway::Family,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Pathway::Individual => "Individual",
            Pathway::Corporate => "Corporate",
            Pathway::Athletics => "Athletics",
            Pathway::Family => "Family",
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pathway {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Pathway::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown pathway '{}'", s))
    }
}

/// Map a submission onto Airtable's Applications columns. `pathway` is
/// forwarded verbatim, so unrecognized tracks still land in the table.
pub fn application_fields(form: &ApplicationForm, pathway: &str, invitation_code: &str) -> Fields {
    let mut fields = Fields::new();
    for (column, key) in BASE_FIELDS {
        fields.insert(column.to_string(), form.get(key).unwrap_or("").into());
    }
    fields.insert("Pathway".into(), pathway.into());
    fields.insert("Invitation Code Used".into(), invitation_code.into());
    fields.insert("Status".into(), APPLICATION_STATUS_UNDER_REVIEW.into());

    for (column, key) in OPTIONAL_FIELDS {
        if let Some(value) = form.get(key) {
            fields.insert(column.to_string(), Value::from(value));
        }
    }
    fields
}

#[instrument(skip(store, form))]
pub async fn submit_application(
    store: &dyn RecordStore,
    form: &ApplicationForm,
    pathway: &str,
    invitation_code: &str,
) -> Result<CreateOutcome> {
    let fields = application_fields(form, pathway, invitation_code);
    let outcome = store.create_record(Table::Applications, fields).await?;
    info!(?outcome, "Application stored");
    Ok(outcome)
}
