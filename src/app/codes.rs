use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, instrument};

use crate::app::ports::RecordStore;
use crate::constants::{CODE_STATUS_ACTIVE, CODE_STATUS_USED};
use crate::error::Result;
use crate::types::{Fields, Table};

/// Outcome of checking an invitation code.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeCheck {
    Valid {
        pathway: Option<String>,
        record_id: String,
    },
    Invalid,
}

impl CodeCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, CodeCheck::Valid { .. })
    }
}

/// Look `candidate` up in the codes table. Matching ignores case and
/// surrounding whitespace; only codes whose status is exactly `Active` count.
#[instrument(skip(store))]
pub async fn validate_code(store: &dyn RecordStore, candidate: &str) -> Result<CodeCheck> {
    let wanted = candidate.trim().to_uppercase();
    let records = store.list_records(Table::Codes).await?;

    let found = records.into_iter().find(|record| {
        record.text("CODE").to_uppercase() == wanted && record.text("Status") == CODE_STATUS_ACTIVE
    });

    let check = match found {
        Some(record) => {
            let pathway = match record.fields.get("Pathway") {
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            };
            CodeCheck::Valid {
                pathway,
                record_id: record.id,
            }
        }
        None => CodeCheck::Invalid,
    };
    info!(valid = check.is_valid(), "Checked invitation code");
    Ok(check)
}

/// Flag a code as consumed by `email` on `used_on`.
#[instrument(skip(store, email))]
pub async fn mark_code_used(
    store: &dyn RecordStore,
    record_id: &str,
    email: &str,
    used_on: NaiveDate,
) -> Result<()> {
    let mut fields = Fields::new();
    fields.insert("Status".into(), CODE_STATUS_USED.into());
    fields.insert("Used By Email".into(), email.into());
    fields.insert("Used Date".into(), used_on.format("%Y-%m-%d").to_string().into());

    store.update_record(Table::Codes, record_id, fields).await?;
    info!("Marked invitation code as used");
    Ok(())
}
