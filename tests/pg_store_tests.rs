//! Postgres sheet store tests. These need a live database and are skipped
//! when `DATABASE_URL` is not set.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use alephic_intake::config::HeaderPolicy;
use alephic_intake::models::{FieldValue, Record};
use alephic_intake::sheets::{self, PgSheetStore, SheetStore, LOG_DOCUMENT_NAME};

async fn store() -> Option<PgSheetStore> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(PgSheetStore::new(pool))
}

/// Form type unique to one test run so reruns never collide.
fn form_type(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7().simple())
}

fn record(form_type: &str, fields: &[(&str, &str)]) -> Record {
    let mut record = Record::new(form_type);
    for (key, value) in fields {
        record.insert(*key, FieldValue::Text(value.to_string()));
    }
    record
}

#[tokio::test]
async fn header_is_frozen_after_first_row() {
    let Some(store) = store().await else { return };
    let form = form_type("contact");

    sheets::append_submission(
        &store,
        HeaderPolicy::Frozen,
        &form,
        "ts1",
        &record(&form, &[("name", "Ada")]),
    )
    .await
    .unwrap();
    let receipt = sheets::append_submission(
        &store,
        HeaderPolicy::Frozen,
        &form,
        "ts2",
        &record(&form, &[("phone", "555"), ("name", "Grace")]),
    )
    .await
    .unwrap();
    assert!(!receipt.sheet_created);
    assert_eq!(receipt.columns_added, 0);

    let document = store.open_document(LOG_DOCUMENT_NAME).await.unwrap();
    let sheet = store.find_sheet(document.id, &form).await.unwrap().unwrap();
    assert_eq!(sheet.header, vec!["Timestamp", "Form Type", "Name"]);
    assert!(sheet.header_bold);
    assert_eq!(sheet.frozen_rows, 1);

    let rows = store.list_rows(sheet.id).await.unwrap();
    assert_eq!(rows[0], vec!["ts1", form.as_str(), "Ada"]);
    assert_eq!(rows[1], vec!["ts2", form.as_str(), "Grace"]);
}

#[tokio::test]
async fn append_policy_extends_header() {
    let Some(store) = store().await else { return };
    let form = form_type("agency-application");

    sheets::append_submission(
        &store,
        HeaderPolicy::Append,
        &form,
        "ts1",
        &record(&form, &[("name", "Ada")]),
    )
    .await
    .unwrap();
    let receipt = sheets::append_submission(
        &store,
        HeaderPolicy::Append,
        &form,
        "ts2",
        &record(&form, &[("name", "Grace"), ("budget", "10k")]),
    )
    .await
    .unwrap();
    assert_eq!(receipt.columns_added, 1);

    let document = store.open_document(LOG_DOCUMENT_NAME).await.unwrap();
    let sheet = store.find_sheet(document.id, &form).await.unwrap().unwrap();
    assert_eq!(sheet.header, vec!["Timestamp", "Form Type", "Name", "Budget"]);
}

#[tokio::test]
async fn concurrent_first_submissions_create_one_sheet() {
    let Some(store) = store().await else { return };
    let store = Arc::new(store);
    let form = form_type("growlytics-early-access");

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let form = form.clone();
        handles.push(tokio::spawn(async move {
            let email = format!("user{i}@example.com");
            sheets::append_submission(
                store.as_ref(),
                HeaderPolicy::Frozen,
                &form,
                "ts",
                &record(&form, &[("email", email.as_str())]),
            )
            .await
            .unwrap()
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().sheet_created {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let document = store.open_document(LOG_DOCUMENT_NAME).await.unwrap();
    let matching: Vec<_> = store
        .list_sheets(document.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|sheet| sheet.name == form)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(store.list_rows(matching[0].id).await.unwrap().len(), 8);
}
