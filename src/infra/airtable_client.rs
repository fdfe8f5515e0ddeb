use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::app::ports::RecordStore;
use crate::config::AirtableConfig;
use crate::error::{AirtableError, Result};
use crate::types::{CreateOutcome, Fields, Record, RecordPage, Table};

/// Resolved credentials and table for one request.
struct Target<'a> {
    token: &'a str,
    url: Url,
}

/// `RecordStore` over Airtable's REST API.
pub struct AirtableClient {
    client: Client,
    config: AirtableConfig,
}

impl AirtableClient {
    pub fn new(config: AirtableConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn table_name(&self, table: Table) -> Option<&str> {
        let tables = &self.config.tables;
        match table {
            Table::Codes => tables.codes.as_deref(),
            Table::Applications => tables.applications.as_deref(),
            Table::Interests => tables.interests.as_deref(),
        }
    }

    /// Fails with `Misconfigured` naming base, token and this table's variable.
    fn target(&self, table: Table) -> Result<Target<'_>> {
        let base = self.config.base_id.as_deref();
        let token = self.config.token.as_deref();
        let name = self.table_name(table);

        let (Some(base), Some(token), Some(name)) = (base, token, name) else {
            return Err(AirtableError::Misconfigured {
                missing: vec![
                    (crate::constants::ENV_AIRTABLE_BASE_ID, base.is_none()),
                    (crate::constants::ENV_AIRTABLE_TOKEN, token.is_none()),
                    (table.env_key(), name.is_none()),
                ],
            });
        };

        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| AirtableError::Url(format!("{}: {}", self.config.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AirtableError::Url(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(["v0", base, name]);

        Ok(Target { token, url })
    }

    async fn fail(table: Table, resp: reqwest::Response) -> AirtableError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        error!(%table, status, body = %body, "Airtable request failed");
        AirtableError::Status { status, body }
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn list_records(&self, table: Table) -> Result<Vec<Record>> {
        let target = self.target(table)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(target.url.clone())
                .header(AUTHORIZATION, format!("Bearer {}", target.token));
            if let Some(cursor) = &offset {
                request = request.query(&[("offset", cursor.as_str())]);
            }

            let resp = request.send().await?;
            if !resp.status().is_success() {
                return Err(Self::fail(table, resp).await);
            }

            let page: RecordPage = serde_json::from_str(&resp.text().await?)?;
            debug!(%table, count = page.records.len(), "Fetched Airtable page");
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    async fn create_record(&self, table: Table, fields: Fields) -> Result<CreateOutcome> {
        let target = self.target(table)?;
        let resp = self
            .client
            .post(target.url)
            .header(AUTHORIZATION, format!("Bearer {}", target.token))
            .header(CONTENT_TYPE, "application/json")
            .body(json!({ "records": [{ "fields": fields }] }).to_string())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail(table, resp).await);
        }

        let text = resp.text().await?;
        let Ok(data) = serde_json::from_str::<Value>(&text) else {
            return Ok(CreateOutcome::NonJsonSuccess { raw: text });
        };

        let record_id = data
            .pointer("/records/0/id")
            .and_then(Value::as_str)
            .map(str::to_string);
        debug!(%table, ?record_id, "Created Airtable record");
        Ok(CreateOutcome::Created { record_id })
    }

    async fn update_record(&self, table: Table, record_id: &str, fields: Fields) -> Result<()> {
        let target = self.target(table)?;
        let resp = self
            .client
            .patch(target.url)
            .header(AUTHORIZATION, format!("Bearer {}", target.token))
            .header(CONTENT_TYPE, "application/json")
            .body(json!({ "records": [{ "id": record_id, "fields": fields }] }).to_string())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail(table, resp).await);
        }
        debug!(%table, record_id, "Updated Airtable record");
        Ok(())
    }
}
