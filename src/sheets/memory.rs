use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::SheetStore;
use crate::error::StoreError;
use crate::models::{HeaderFormat, LogDocument, Sheet};

/// In-process sheet store. Contents are lost on restart.
#[derive(Default)]
pub struct MemorySheetStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: Vec<LogDocument>,
    sheets: Vec<Sheet>,
    rows: HashMap<Uuid, Vec<Vec<String>>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("sheet store lock poisoned".to_string()))
    }
}

impl Inner {
    fn sheet_mut(&mut self, sheet_id: Uuid) -> Result<&mut Sheet, StoreError> {
        self.sheets
            .iter_mut()
            .find(|s| s.id == sheet_id)
            .ok_or_else(|| StoreError::Unavailable(format!("sheet {sheet_id} not found")))
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn open_document(&self, name: &str) -> Result<LogDocument, StoreError> {
        let mut inner = self.lock()?;
        if let Some(doc) = inner.documents.iter().find(|d| d.name == name) {
            return Ok(doc.clone());
        }

        let doc = LogDocument {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.documents.push(doc.clone());
        Ok(doc)
    }

    async fn find_sheet(&self, document_id: Uuid, name: &str) -> Result<Option<Sheet>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .sheets
            .iter()
            .find(|s| s.document_id == document_id && s.name == name)
            .cloned())
    }

    async fn insert_sheet(
        &self,
        document_id: Uuid,
        name: &str,
        header: &[String],
        format: HeaderFormat,
    ) -> Result<(Sheet, bool), StoreError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner
            .sheets
            .iter()
            .find(|s| s.document_id == document_id && s.name == name)
        {
            return Ok((existing.clone(), false));
        }

        let sheet = Sheet {
            id: Uuid::now_v7(),
            document_id,
            name: name.to_string(),
            header: header.to_vec(),
            header_bold: format.bold,
            frozen_rows: format.frozen_rows,
            created_at: Utc::now(),
        };
        inner.sheets.push(sheet.clone());
        inner.rows.insert(sheet.id, Vec::new());
        Ok((sheet, true))
    }

    async fn extend_header(&self, sheet_id: Uuid, extra: &[String]) -> Result<Vec<String>, StoreError> {
        let mut inner = self.lock()?;
        let sheet = inner.sheet_mut(sheet_id)?;
        for column in extra {
            if !sheet.header.contains(column) {
                sheet.header.push(column.clone());
            }
        }
        Ok(sheet.header.clone())
    }

    async fn append_row(&self, sheet_id: Uuid, cells: &[String]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.sheet_mut(sheet_id)?;
        inner.rows.entry(sheet_id).or_default().push(cells.to_vec());
        Ok(())
    }

    async fn list_sheets(&self, document_id: Uuid) -> Result<Vec<Sheet>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .sheets
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn list_rows(&self, sheet_id: Uuid) -> Result<Vec<Vec<String>>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.rows.get(&sheet_id).cloned().unwrap_or_default())
    }
}
