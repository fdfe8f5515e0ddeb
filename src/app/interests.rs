use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::app::ports::RecordStore;
use crate::constants::INTEREST_STATUS_NOT_CONTACTED;
use crate::error::Result;
use crate::types::{CreateOutcome, Fields, Table};

/// An alternative offering shown after an application is submitted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InterestOption {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const INTEREST_OPTIONS: &[InterestOption] = &[
    InterestOption {
        id: "1-Day Workshop",
        label: "1-Day Workshops",
        description: "Lower investment, single focus areas",
    },
    InterestOption {
        id: "2-Day Intensive",
        label: "2-Day Intensives",
        description: "Weekend format for deeper work",
    },
    InterestOption {
        id: "Custom Event",
        label: "Custom Event for My Organization",
        description: "Tailored experiences for teams",
    },
    InterestOption {
        id: "Speaker Series",
        label: "Speaker Series / Group Discussions",
        description: "Ongoing community engagement",
    },
    InterestOption {
        id: "Waitlist",
        label: "Waitlist for Future Cohorts",
        description: "Be notified when new dates open",
    },
];

pub fn interest_fields(email: &str, full_name: Option<&str>, interests: &[String]) -> Fields {
    let mut fields = Fields::new();
    fields.insert("Email".into(), email.into());
    fields.insert("Full Name".into(), full_name.unwrap_or("").into());
    fields.insert(
        "Interests".into(),
        Value::Array(interests.iter().cloned().map(Value::String).collect()),
    );
    fields.insert("Status".into(), INTEREST_STATUS_NOT_CONTACTED.into());
    fields
}

#[instrument(skip(store, email, full_name))]
pub async fn submit_interests(
    store: &dyn RecordStore,
    email: &str,
    full_name: Option<&str>,
    interests: &[String],
) -> Result<CreateOutcome> {
    let fields = interest_fields(email, full_name, interests);
    let outcome = store.create_record(Table::Interests, fields).await?;
    info!(count = interests.len(), "Alternative interests stored");
    Ok(outcome)
}
