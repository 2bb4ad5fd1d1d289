//! Durable file storage for uploaded attachments.

pub mod local;

use async_trait::async_trait;

use crate::error::StoreError;

pub use local::LocalFileStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub folder: String,
    pub key: String,
    pub name: String,
    pub mime_type: String,
    pub size: usize,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Look a folder up by name, creating it on first use.
    async fn ensure_folder(&self, name: &str) -> Result<Folder, StoreError>;

    /// Store `bytes` privately inside `folder`.
    async fn create_file(
        &self,
        folder: &Folder,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StoreError>;

    /// Make the file readable by anyone holding the link; returns that link.
    async fn share_with_link(&self, file: &StoredFile) -> Result<String, StoreError>;
}
