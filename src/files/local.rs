use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::{FileStore, Folder, StoredFile};
use crate::error::StoreError;

/// Files live under `<root>/private` until shared, then move to
/// `<root>/public`, which the router serves at the public base URL.
pub struct LocalFileStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn public_dir(&self) -> PathBuf {
        public_dir(&self.root)
    }

    fn private_dir(&self) -> PathBuf {
        self.root.join("private")
    }

    fn relative_path(file: &StoredFile) -> PathBuf {
        Path::new(&file.folder).join(&file.key).join(&file.name)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn ensure_folder(&self, name: &str) -> Result<Folder, StoreError> {
        let slug = slugify(name);
        tokio::fs::create_dir_all(self.private_dir().join(&slug)).await?;
        Ok(Folder {
            name: name.to_string(),
            slug,
        })
    }

    async fn create_file(
        &self,
        folder: &Folder,
        name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StoreError> {
        let file = StoredFile {
            folder: folder.slug.clone(),
            key: Uuid::now_v7().simple().to_string(),
            name: sanitize_filename(name),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
        };

        let path = self.private_dir().join(Self::relative_path(&file));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = file.size, "Stored file");
        Ok(file)
    }

    async fn share_with_link(&self, file: &StoredFile) -> Result<String, StoreError> {
        let relative = Self::relative_path(file);
        let from = self.private_dir().join(&relative);
        let to = self.public_dir().join(&relative);
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&from, &to).await?;

        Ok(format!(
            "{}/{}/{}/{}",
            self.public_base_url, file.folder, file.key, file.name
        ))
    }
}

/// Directory holding shared files for a store rooted at `root`.
pub fn public_dir(root: &Path) -> PathBuf {
    root.join("public")
}

/// `Alephic Labs - AI Lab Resumes` -> `alephic-labs-ai-lab-resumes`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "files".to_string()
    } else {
        slug.to_string()
    }
}

/// Reduce a client-supplied filename to a safe single path segment.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(200)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_folder_names() {
        assert_eq!(slugify("Alephic Labs - AI Lab Resumes"), "alephic-labs-ai-lab-resumes");
        assert_eq!(slugify("  "), "files");
    }

    #[test]
    fn sanitizes_filenames() {
        assert_eq!(sanitize_filename("Ada Lovelace CV.pdf"), "Ada_Lovelace_CV.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename(".env"), "env");
    }

    #[tokio::test]
    async fn shared_file_moves_to_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path(), "http://localhost:3000/files/");

        let folder = store.ensure_folder("Alephic Labs - AI Lab Resumes").await.unwrap();
        let again = store.ensure_folder("Alephic Labs - AI Lab Resumes").await.unwrap();
        assert_eq!(folder, again);

        let file = store
            .create_file(&folder, "cv.pdf", "application/pdf", b"%PDF-1.4")
            .await
            .unwrap();
        assert_eq!(file.size, 8);

        let url = store.share_with_link(&file).await.unwrap();
        assert_eq!(
            url,
            format!("http://localhost:3000/files/alephic-labs-ai-lab-resumes/{}/cv.pdf", file.key)
        );

        let public = store.public_dir().join(&folder.slug).join(&file.key).join("cv.pdf");
        assert_eq!(tokio::fs::read(public).await.unwrap(), b"%PDF-1.4");
    }
}
