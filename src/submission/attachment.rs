use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::files::FileStore;
use crate::models::{FieldValue, Record};

/// Collection every uploaded resume is filed under.
pub const RESUME_FOLDER: &str = "Alephic Labs - AI Lab Resumes";
pub const RESUME_FILE_KEY: &str = "resume_file";
pub const RESUME_FILENAME_KEY: &str = "resume_filename";
pub const DEFAULT_RESUME_FILENAME: &str = "resume.pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOutcome {
    Stored { url: String },
    Failed { reason: String },
}

impl AttachmentOutcome {
    /// Value written back into the record in place of the data URI.
    pub fn record_value(&self) -> String {
        match self {
            AttachmentOutcome::Stored { url } => url.clone(),
            AttachmentOutcome::Failed { reason } => format!("Error saving resume: {reason}"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decode `data:<mime>;base64,<payload>`.
pub fn parse_data_uri(uri: &str) -> Result<DataUri, String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;

    let mime_type = meta.split(';').next().unwrap_or_default().trim();
    let mime_type = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {e}"))?;

    Ok(DataUri {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Store a data-URI attachment and return its shareable link.
pub async fn materialize(store: &dyn FileStore, uri: &str, filename: &str) -> AttachmentOutcome {
    match store_data_uri(store, uri, filename).await {
        Ok(url) => AttachmentOutcome::Stored { url },
        Err(reason) => AttachmentOutcome::Failed { reason },
    }
}

async fn store_data_uri(store: &dyn FileStore, uri: &str, filename: &str) -> Result<String, String> {
    let data = parse_data_uri(uri)?;
    let folder = store
        .ensure_folder(RESUME_FOLDER)
        .await
        .map_err(|e| e.to_string())?;
    let file = store
        .create_file(&folder, filename, &data.mime_type, &data.bytes)
        .await
        .map_err(|e| e.to_string())?;
    store.share_with_link(&file).await.map_err(|e| e.to_string())
}

/// Replace an inline resume with a link (or error marker) and drop the
/// helper filename field. Returns `None` when there was nothing to store.
pub async fn process_resume(store: &dyn FileStore, record: &mut Record) -> Option<AttachmentOutcome> {
    let filename = record
        .remove(RESUME_FILENAME_KEY)
        .map(|v| v.render())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_RESUME_FILENAME.to_string());

    let uri = record
        .get(RESUME_FILE_KEY)
        .and_then(FieldValue::as_text)
        .filter(|value| value.starts_with("data:"))?
        .to_string();

    let outcome = materialize(store, &uri, &filename).await;
    match &outcome {
        AttachmentOutcome::Stored { url } => tracing::info!(%url, "Stored resume"),
        AttachmentOutcome::Failed { reason } => tracing::warn!(%reason, "Failed to store resume"),
    }
    record.insert(RESUME_FILE_KEY, FieldValue::Text(outcome.record_value()));
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::LocalFileStore;

    #[test]
    fn parses_base64_data_uri() {
        let uri = parse_data_uri("data:application/pdf;base64,JVBERi0xLjQ=").unwrap();
        assert_eq!(uri.mime_type, "application/pdf");
        assert_eq!(uri.bytes, b"%PDF-1.4");
    }

    #[test]
    fn rejects_malformed_data_uri() {
        assert!(parse_data_uri("data:application/pdf;base64").is_err());
        assert!(parse_data_uri("data:application/pdf;base64,@@@").is_err());
        assert!(parse_data_uri("http://example.com").is_err());
    }

    #[tokio::test]
    async fn resume_becomes_link_and_filename_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path(), "https://forms.example.com/files");

        let mut record = Record::new("agency-application");
        record.insert("name", FieldValue::Text("Ada".into()));
        record.insert(
            RESUME_FILE_KEY,
            FieldValue::Text("data:application/pdf;base64,JVBERi0xLjQ=".into()),
        );
        record.insert(RESUME_FILENAME_KEY, FieldValue::Text("ada.pdf".into()));

        let outcome = process_resume(&store, &mut record).await.unwrap();
        let AttachmentOutcome::Stored { url } = outcome else {
            panic!("expected stored outcome");
        };

        assert!(url.starts_with("https://forms.example.com/files/alephic-labs-ai-lab-resumes/"));
        assert!(url.ends_with("/ada.pdf"));
        assert_eq!(record.get(RESUME_FILE_KEY).and_then(FieldValue::as_text), Some(url.as_str()));
        assert!(record.get(RESUME_FILENAME_KEY).is_none());
    }

    #[tokio::test]
    async fn bad_payload_leaves_error_marker() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path(), "https://forms.example.com/files");

        let mut record = Record::new("agency-application");
        record.insert(RESUME_FILE_KEY, FieldValue::Text("data:application/pdf;base64,%%%".into()));

        let outcome = process_resume(&store, &mut record).await.unwrap();
        assert!(matches!(outcome, AttachmentOutcome::Failed { .. }));

        let stored = record.get(RESUME_FILE_KEY).and_then(FieldValue::as_text).unwrap();
        assert!(stored.starts_with("Error saving resume: "));
    }

    #[tokio::test]
    async fn plain_values_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path(), "https://forms.example.com/files");

        let mut record = Record::new("agency-application");
        record.insert(RESUME_FILE_KEY, FieldValue::Text("https://example.com/cv.pdf".into()));
        record.insert(RESUME_FILENAME_KEY, FieldValue::Text("cv.pdf".into()));

        assert!(process_resume(&store, &mut record).await.is_none());
        assert_eq!(
            record.get(RESUME_FILE_KEY).and_then(FieldValue::as_text),
            Some("https://example.com/cv.pdf")
        );
        assert!(record.get(RESUME_FILENAME_KEY).is_none());
    }
}
