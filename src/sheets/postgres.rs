use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::SheetStore;
use crate::db;
use crate::error::StoreError;
use crate::models::{HeaderFormat, LogDocument, Sheet};

/// Sheet store backed by the `log_*` tables.
pub struct PgSheetStore {
    pool: PgPool,
}

impl PgSheetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SheetStore for PgSheetStore {
    async fn open_document(&self, name: &str) -> Result<LogDocument, StoreError> {
        Ok(db::sheets::open_or_create_document(&self.pool, name).await?)
    }

    async fn find_sheet(&self, document_id: Uuid, name: &str) -> Result<Option<Sheet>, StoreError> {
        Ok(db::sheets::find_sheet(&self.pool, document_id, name).await?)
    }

    async fn insert_sheet(
        &self,
        document_id: Uuid,
        name: &str,
        header: &[String],
        format: HeaderFormat,
    ) -> Result<(Sheet, bool), StoreError> {
        Ok(db::sheets::insert_sheet(&self.pool, document_id, name, header, format).await?)
    }

    async fn extend_header(&self, sheet_id: Uuid, extra: &[String]) -> Result<Vec<String>, StoreError> {
        Ok(db::sheets::extend_header(&self.pool, sheet_id, extra).await?)
    }

    async fn append_row(&self, sheet_id: Uuid, cells: &[String]) -> Result<(), StoreError> {
        Ok(db::sheets::append_row(&self.pool, sheet_id, cells).await?)
    }

    async fn list_sheets(&self, document_id: Uuid) -> Result<Vec<Sheet>, StoreError> {
        Ok(db::sheets::list_sheets(&self.pool, document_id).await?)
    }

    async fn list_rows(&self, sheet_id: Uuid) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(db::sheets::list_rows(&self.pool, sheet_id).await?)
    }
}
