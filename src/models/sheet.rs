use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LogDocument {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Sheet {
    pub id: Uuid,
    pub document_id: Uuid,
    pub name: String,
    pub header: Vec<String>,
    pub header_bold: bool,
    pub frozen_rows: i32,
    pub created_at: DateTime<Utc>,
}

/// Formatting applied to a freshly written header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFormat {
    pub bold: bool,
    pub frozen_rows: i32,
}

impl Default for HeaderFormat {
    fn default() -> Self {
        Self {
            bold: true,
            frozen_rows: 1,
        }
    }
}
