//! Tabular submission log: one document, one sheet per form type.

pub mod headers;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::HeaderPolicy;
use crate::error::StoreError;
use crate::models::{HeaderFormat, LogDocument, Record, Sheet};

pub use memory::MemorySheetStore;
pub use postgres::PgSheetStore;

/// Name of the single log document every submission lands in.
pub const LOG_DOCUMENT_NAME: &str = "Alephic Labs - Submissions";

#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Open the named document, creating it when absent.
    async fn open_document(&self, name: &str) -> Result<LogDocument, StoreError>;

    async fn find_sheet(&self, document_id: Uuid, name: &str) -> Result<Option<Sheet>, StoreError>;

    /// Create a sheet with its header row. When the sheet already exists the
    /// stored sheet is returned unchanged with `created == false`.
    async fn insert_sheet(
        &self,
        document_id: Uuid,
        name: &str,
        header: &[String],
        format: HeaderFormat,
    ) -> Result<(Sheet, bool), StoreError>;

    /// Append the missing columns of `extra` to the header; returns the new header.
    async fn extend_header(&self, sheet_id: Uuid, extra: &[String]) -> Result<Vec<String>, StoreError>;

    async fn append_row(&self, sheet_id: Uuid, cells: &[String]) -> Result<(), StoreError>;

    async fn list_sheets(&self, document_id: Uuid) -> Result<Vec<Sheet>, StoreError>;

    async fn list_rows(&self, sheet_id: Uuid) -> Result<Vec<Vec<String>>, StoreError>;
}

/// What a successful append did to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    pub sheet: String,
    pub sheet_created: bool,
    pub columns_added: usize,
    pub cells: Vec<String>,
}

/// Append `record` to the sheet for `form_type`, creating the sheet and its
/// header row on first use.
pub async fn append_submission(
    store: &dyn SheetStore,
    policy: HeaderPolicy,
    form_type: &str,
    timestamp: &str,
    record: &Record,
) -> Result<AppendReceipt, StoreError> {
    let document = store.open_document(LOG_DOCUMENT_NAME).await?;

    let (sheet, sheet_created) = match store.find_sheet(document.id, form_type).await? {
        Some(sheet) => (sheet, false),
        None => {
            let header = headers::header_for_record(record);
            let (sheet, created) = store
                .insert_sheet(document.id, form_type, &header, HeaderFormat::default())
                .await?;
            if created {
                tracing::info!(sheet = form_type, columns = header.len(), "Created log sheet");
            }
            (sheet, created)
        }
    };

    let mut header = sheet.header;
    let mut columns_added = 0;
    if policy == HeaderPolicy::Append {
        let missing = headers::missing_columns(&header, record);
        if !missing.is_empty() {
            let before = header.len();
            header = store.extend_header(sheet.id, &missing).await?;
            columns_added = header.len().saturating_sub(before);
            tracing::info!(sheet = form_type, columns_added, "Extended log sheet header");
        }
    }

    let cells = headers::build_row(&header, form_type, timestamp, record);
    store.append_row(sheet.id, &cells).await?;

    Ok(AppendReceipt {
        sheet: sheet.name,
        sheet_created,
        columns_added,
        cells,
    })
}
