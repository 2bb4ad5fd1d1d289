#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

use alephic_intake::config::{Config, HeaderPolicy};
use alephic_intake::email::{Mailer, Notification};
use alephic_intake::error::StoreError;
use alephic_intake::files::{FileStore, LocalFileStore};
use alephic_intake::models::{HeaderFormat, LogDocument, Sheet};
use alephic_intake::sheets::{MemorySheetStore, SheetStore, LOG_DOCUMENT_NAME};
use alephic_intake::state::AppState;
use alephic_intake::FILES_PATH;

/// Mailer that keeps every notification and can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, notification: &Notification) -> Result<(), String> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err("SMTP relay refused connection".to_string());
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Sheet store whose every call fails.
pub struct BrokenSheetStore;

fn broken() -> StoreError {
    StoreError::Unavailable("spreadsheet service unavailable".to_string())
}

#[async_trait]
impl SheetStore for BrokenSheetStore {
    async fn open_document(&self, _name: &str) -> Result<LogDocument, StoreError> {
        Err(broken())
    }

    async fn find_sheet(&self, _document_id: Uuid, _name: &str) -> Result<Option<Sheet>, StoreError> {
        Err(broken())
    }

    async fn insert_sheet(
        &self,
        _document_id: Uuid,
        _name: &str,
        _header: &[String],
        _format: HeaderFormat,
    ) -> Result<(Sheet, bool), StoreError> {
        Err(broken())
    }

    async fn extend_header(&self, _sheet_id: Uuid, _extra: &[String]) -> Result<Vec<String>, StoreError> {
        Err(broken())
    }

    async fn append_row(&self, _sheet_id: Uuid, _cells: &[String]) -> Result<(), StoreError> {
        Err(broken())
    }

    async fn list_sheets(&self, _document_id: Uuid) -> Result<Vec<Sheet>, StoreError> {
        Err(broken())
    }

    async fn list_rows(&self, _sheet_id: Uuid) -> Result<Vec<Vec<String>>, StoreError> {
        Err(broken())
    }
}

/// A running test server with in-memory collaborators.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub sheets: Arc<MemorySheetStore>,
    pub mailer: Arc<RecordingMailer>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON payload to the intake endpoint, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST a raw body with an explicit content type.
    pub async fn submit_raw(&self, content_type: &str, body: &'static str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .expect("submit raw failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Header and rows of the sheet for `form_type`, if it exists.
    pub async fn sheet(&self, form_type: &str) -> Option<(Vec<String>, Vec<Vec<String>>)> {
        let doc = self.sheets.open_document(LOG_DOCUMENT_NAME).await.unwrap();
        let sheet = self.sheets.find_sheet(doc.id, form_type).await.unwrap()?;
        let rows = self.sheets.list_rows(sheet.id).await.unwrap();
        Some((sheet.header, rows))
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed")
    }
}

pub fn test_config(base_url: String, upload_dir: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url,
        database_url: None,
        max_body_size: 10 * 1024 * 1024,
        log_level: "warn".to_string(),
        notify_to: "contact@alephiclabs.com".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        static_dir: None,
        admin_token: Some("test-admin-token".to_string()),
        honeypot_field: Some("website".to_string()),
        header_policy: HeaderPolicy::Frozen,
        timezone: Tz::America__New_York,
        rate_limit: 100,
        rate_window_secs: 60,
        trusted_proxies: vec![],
        smtp: None,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a test app; `tweak` adjusts the config before the server starts.
pub async fn spawn_app_with(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let sheets = Arc::new(MemorySheetStore::new());
    spawn_app_with_store(sheets.clone(), sheets, tweak).await
}

/// Spawn with a custom sheet store. `inspect` is the memory store the
/// `TestApp::sheet` helper reads back from.
pub async fn spawn_app_with_store(
    store: Arc<dyn SheetStore>,
    inspect: Arc<MemorySheetStore>,
    tweak: impl FnOnce(&mut Config),
) -> TestApp {
    spawn(store, inspect, true, tweak).await
}

/// Spawn with no mailer configured at all.
pub async fn spawn_app_without_mailer() -> TestApp {
    let sheets = Arc::new(MemorySheetStore::new());
    spawn(sheets.clone(), sheets, false, |_| {}).await
}

async fn spawn(
    store: Arc<dyn SheetStore>,
    inspect: Arc<MemorySheetStore>,
    with_mailer: bool,
    tweak: impl FnOnce(&mut Config),
) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    let mut config = test_config(format!("http://{addr}"), &upload_dir);
    tweak(&mut config);

    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
        upload_dir.path(),
        format!("http://{addr}{FILES_PATH}"),
    ));
    let mailer = Arc::new(RecordingMailer::default());
    let wired = with_mailer.then(|| mailer.clone() as Arc<dyn Mailer>);

    let state = Arc::new(AppState::new(config, store, files, wired));
    let app = alephic_intake::build_app(state);

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        sheets: inspect,
        mailer,
        upload_dir,
    }
}
