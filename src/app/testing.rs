//! Test double for `RecordStore`.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::app::ports::RecordStore;
use crate::error::{AirtableError, Result};
use crate::types::{CreateOutcome, Fields, Record, Table};

/// In-memory store recording every write.
#[derive(Default)]
pub struct MockStore {
    pub records: Vec<Record>,
    pub created: Arc<Mutex<Vec<(Table, Fields)>>>,
    pub updated: Arc<Mutex<Vec<(Table, String, Fields)>>>,
    pub fail_with: Option<u16>,
}

impl MockStore {
    pub fn with_codes(codes: &[(&str, &str, &str, Option<&str>)]) -> Self {
        let records = codes
            .iter()
            .map(|(id, code, status, pathway)| {
                let mut fields = json!({ "CODE": code, "Status": status });
                if let Some(p) = pathway {
                    fields["Pathway"] = json!(p);
                }
                Record {
                    id: id.to_string(),
                    fields: fields.as_object().cloned().unwrap_or_default(),
                    created_time: None,
                }
            })
            .collect();
        Self {
            records,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        match self.fail_with {
            Some(status) => Err(AirtableError::Status {
                status,
                body: "{\"error\":\"NOT_AUTHORIZED\"}".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn list_records(&self, _table: Table) -> Result<Vec<Record>> {
        self.check()?;
        Ok(self.records.clone())
    }

    async fn create_record(&self, table: Table, fields: Fields) -> Result<CreateOutcome> {
        self.check()?;
        let mut created = self.created.lock().await;
        created.push((table, fields));
        Ok(CreateOutcome::Created {
            record_id: Some(format!("recNew{}", created.len())),
        })
    }

    async fn update_record(&self, table: Table, record_id: &str, fields: Fields) -> Result<()> {
        self.check()?;
        self.updated
            .lock()
            .await
            .push((table, record_id.to_string(), fields));
        Ok(())
    }
}
