use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{HeaderFormat, LogDocument, Sheet};

/// Open the document with the given name, creating it on first use.
/// Concurrent callers converge on the same row.
pub async fn open_or_create_document(pool: &PgPool, name: &str) -> Result<LogDocument, sqlx::Error> {
    sqlx::query(
        "INSERT INTO log_documents (id, name) VALUES ($1, $2)
         ON CONFLICT (name) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, LogDocument>("SELECT * FROM log_documents WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn find_sheet(
    pool: &PgPool,
    document_id: Uuid,
    name: &str,
) -> Result<Option<Sheet>, sqlx::Error> {
    sqlx::query_as::<_, Sheet>("SELECT * FROM log_sheets WHERE document_id = $1 AND name = $2")
        .bind(document_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Insert a sheet with its header row. Returns `(sheet, created)`; when another
/// writer created the sheet first, its row (and header) wins.
pub async fn insert_sheet(
    pool: &PgPool,
    document_id: Uuid,
    name: &str,
    header: &[String],
    format: HeaderFormat,
) -> Result<(Sheet, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, Sheet>(
        "INSERT INTO log_sheets (id, document_id, name, header, header_bold, frozen_rows)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (document_id, name) DO NOTHING
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(document_id)
    .bind(name)
    .bind(header)
    .bind(format.bold)
    .bind(format.frozen_rows)
    .fetch_optional(pool)
    .await?;

    if let Some(sheet) = inserted {
        return Ok((sheet, true));
    }

    let existing = sqlx::query_as::<_, Sheet>(
        "SELECT * FROM log_sheets WHERE document_id = $1 AND name = $2",
    )
    .bind(document_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok((existing, false))
}

pub async fn list_sheets(pool: &PgPool, document_id: Uuid) -> Result<Vec<Sheet>, sqlx::Error> {
    sqlx::query_as::<_, Sheet>(
        "SELECT * FROM log_sheets WHERE document_id = $1 ORDER BY created_at ASC, name ASC",
    )
    .bind(document_id)
    .fetch_all(pool)
    .await
}

/// Append the columns of `extra` that the header does not hold yet.
/// Runs under a row lock so concurrent writers never duplicate a column.
pub async fn extend_header(
    pool: &PgPool,
    sheet_id: Uuid,
    extra: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut header: Vec<String> =
        sqlx::query_scalar("SELECT header FROM log_sheets WHERE id = $1 FOR UPDATE")
            .bind(sheet_id)
            .fetch_one(&mut *tx)
            .await?;

    let before = header.len();
    for column in extra {
        if !header.contains(column) {
            header.push(column.clone());
        }
    }

    if header.len() != before {
        sqlx::query("UPDATE log_sheets SET header = $2 WHERE id = $1")
            .bind(sheet_id)
            .bind(&header)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(header)
}

pub async fn append_row(pool: &PgPool, sheet_id: Uuid, cells: &[String]) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO log_rows (sheet_id, cells) VALUES ($1, $2)")
        .bind(sheet_id)
        .bind(cells)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_rows(pool: &PgPool, sheet_id: Uuid) -> Result<Vec<Vec<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Vec<String>>(
        "SELECT cells FROM log_rows WHERE sheet_id = $1 ORDER BY id ASC",
    )
    .bind(sheet_id)
    .fetch_all(pool)
    .await
}
