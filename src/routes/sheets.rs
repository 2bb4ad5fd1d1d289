use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AdminToken;
use crate::error::AppError;
use crate::models::Sheet;
use crate::sheets::LOG_DOCUMENT_NAME;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub header: Vec<String>,
    pub rows: usize,
}

pub async fn list(
    _admin: AdminToken,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let document = state.sheets.open_document(LOG_DOCUMENT_NAME).await?;
    let sheets = state.sheets.list_sheets(document.id).await?;

    let mut summaries = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let rows = state.sheets.list_rows(sheet.id).await?.len();
        summaries.push(SheetSummary {
            name: sheet.name,
            header: sheet.header,
            rows,
        });
    }

    Ok(Json(json!({
        "document": document.name,
        "sheets": summaries,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

pub async fn export(
    _admin: AdminToken,
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let document = state.sheets.open_document(LOG_DOCUMENT_NAME).await?;
    let sheet = state
        .sheets
        .find_sheet(document.id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Sheet not found".to_string()))?;
    let rows = state.sheets.list_rows(sheet.id).await?;

    match params.format.as_deref().unwrap_or("json") {
        "csv" => {
            let csv = export_csv(&sheet, &rows);
            let disposition = format!("attachment; filename=\"{}.csv\"", csv_filename(&sheet.name));
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        "json" => Ok(Json(json!({
            "sheet": sheet.name,
            "header": sheet.header,
            "rows": rows,
        }))
        .into_response()),
        other => Err(AppError::BadRequest(format!("Unsupported format: {other}"))),
    }
}

/// Header row first; rows written before a header extension are padded.
fn export_csv(sheet: &Sheet, rows: &[Vec<String>]) -> String {
    let width = sheet.header.len();
    let mut csv = String::new();

    write_csv_line(&mut csv, sheet.header.iter().map(String::as_str));
    for row in rows {
        let padding = width.saturating_sub(row.len());
        write_csv_line(
            &mut csv,
            row.iter().map(String::as_str).chain(std::iter::repeat_n("", padding)),
        );
    }

    csv
}

fn write_csv_line<'a>(csv: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            csv.push(',');
        }
        csv.push_str(&csv_escape(cell));
    }
    csv.push('\n');
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
