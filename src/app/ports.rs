use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CreateOutcome, Fields, Record, Table};

/// Tabular record store the handlers forward to.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record in `table`, across all pages.
    async fn list_records(&self, table: Table) -> Result<Vec<Record>>;

    async fn create_record(&self, table: Table, fields: Fields) -> Result<CreateOutcome>;

    async fn update_record(&self, table: Table, record_id: &str, fields: Fields) -> Result<()>;
}
