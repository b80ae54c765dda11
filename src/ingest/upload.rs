//! Upload boundary.
//!
//! Validates incoming payloads before anything touches the store or the
//! pipeline, persists accepted bytes content-addressed, and hands the
//! document to the simulator.

use std::path::PathBuf;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::domain::ProcessingStatus;
use crate::pipeline::PipelineSimulator;
use crate::store::StoreError;

/// PDF files start with this magic
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Validation and registration failures, surfaced synchronously
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only PDF files are allowed")]
    NotPdf,

    #[error("File size must be less than {limit_mb}MB")]
    TooLarge { actual: u64, limit_mb: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What the caller gets back once an upload is registered
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadReceipt {
    pub document_id: Uuid,
    pub filename: String,
    pub status: ProcessingStatus,
}

/// Reject non-PDF or oversize content before any state mutation.
pub fn validate_upload(filename: &str, bytes: &[u8], max_bytes: u64) -> Result<(), UploadError> {
    let is_pdf_name = filename.rsplit('.').next().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf_name || !bytes.starts_with(PDF_MAGIC) {
        return Err(UploadError::NotPdf);
    }

    let actual = bytes.len() as u64;
    if actual > max_bytes {
        return Err(UploadError::TooLarge {
            actual,
            limit_mb: max_bytes / (1024 * 1024),
        });
    }

    Ok(())
}

/// Accepts validated uploads and starts their processing lifecycle
pub struct Uploader {
    simulator: Arc<PipelineSimulator>,
    uploads_dir: PathBuf,
    max_bytes: u64,
}

impl Uploader {
    pub fn new(simulator: Arc<PipelineSimulator>, uploads_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            simulator,
            uploads_dir,
            max_bytes,
        }
    }

    /// Validate, persist, and register a single PDF payload.
    ///
    /// The bytes are stored content-addressed (`<sha256[..12]>.pdf`), so
    /// re-uploading identical content reuses the same blob while still
    /// registering a fresh document.
    pub async fn upload(
        &self,
        owner: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<UploadReceipt, UploadError> {
        validate_upload(filename, bytes, self.max_bytes)?;

        fs::create_dir_all(&self.uploads_dir).await?;

        let digest = Sha256::digest(bytes);
        let storage_name = format!("{}.pdf", &hex::encode(digest)[..12]);
        let storage_path = self.uploads_dir.join(&storage_name);
        fs::write(&storage_path, bytes).await?;

        let document = self
            .simulator
            .register_upload(owner, filename, &storage_path.to_string_lossy())
            .await?;

        info!(
            document_id = %document.id,
            bytes = bytes.len(),
            "Upload accepted: {}",
            filename
        );

        Ok(UploadReceipt {
            document_id: document.id,
            filename: document.original_filename,
            status: document.processing_status,
        })
    }
}
