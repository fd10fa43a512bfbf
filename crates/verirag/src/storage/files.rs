//! Filesystem storage for uploaded PDFs

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{Error, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Writes uploads under a single directory as `<id>-<filename>`
#[derive(Debug, Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
}

impl UploadStore {
    /// Create the store, creating the directory if needed
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self { upload_dir })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Persist an uploaded PDF and return its path
    pub async fn save(&self, document_id: &Uuid, filename: &str, data: &[u8]) -> Result<PathBuf> {
        if !is_pdf(data) {
            return Err(Error::extraction(filename, "file is not a PDF"));
        }

        let path = self
            .upload_dir
            .join(format!("{}-{}", document_id, sanitize_filename(filename)));
        tokio::fs::write(&path, data).await?;

        tracing::debug!("Saved upload {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }
}

/// Cheap header check for the `%PDF-` marker
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}
