//! Simulated processing pipeline.
//!
//! Stands in for the server-side job that would parse and index an
//! uploaded document. Each registered upload gets one background task
//! that advances the status through its timed stages and deposits the
//! artifact triple on completion. Errors inside the task are logged,
//! never propagated; a stale task observing a store rejection (document
//! failed or deleted meanwhile) simply stops.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Document, ProcessingStatus};
use crate::store::{DocumentStore, StoreError};

use super::generator;

/// Delays between the simulated stages
#[derive(Debug, Clone, Copy)]
pub struct StageDelays {
    /// UPLOADING → PROCESSING
    pub upload: Duration,

    /// PROCESSING → COMPLETED
    pub processing: Duration,
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            upload: Duration::from_secs(2),
            processing: Duration::from_secs(3),
        }
    }
}

/// Drives registered documents through their lifecycle
pub struct PipelineSimulator {
    store: Arc<dyn DocumentStore>,
    delays: StageDelays,
}

impl PipelineSimulator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            delays: StageDelays::default(),
        }
    }

    pub fn with_delays(store: Arc<dyn DocumentStore>, delays: StageDelays) -> Self {
        Self { store, delays }
    }

    /// Register an upload and start its background progression.
    ///
    /// The document is returned immediately in UPLOADING state; the
    /// spawned task owns the rest of the lifecycle.
    #[instrument(skip(self, storage_path), fields(owner = %owner, filename = %filename))]
    pub async fn register_upload(
        &self,
        owner: &str,
        filename: &str,
        storage_path: &str,
    ) -> Result<Document, StoreError> {
        let document = Document::new(owner, filename, storage_path);
        self.store.insert_document(document.clone()).await?;

        info!(document_id = %document.id, "Upload registered");

        let store = Arc::clone(&self.store);
        let delays = self.delays;
        let id = document.id;
        let owner = document.owner.clone();
        let filename = document.original_filename.clone();

        tokio::spawn(async move {
            if let Err(e) = advance(store, delays, id, &owner, &filename).await {
                warn!(document_id = %id, error = %e, "Pipeline progression stopped");
            }
        });

        Ok(document)
    }

    /// Explicitly fail a document at any point before completion.
    ///
    /// The background task, if still running, observes the terminal state
    /// at its next transition attempt and stops; no artifacts are ever
    /// created for a failed document.
    pub async fn fail_document(&self, id: Uuid) -> Result<Document, StoreError> {
        let doc = self.store.update_status(id, ProcessingStatus::Failed).await?;
        info!(document_id = %id, "Document marked FAILED");
        Ok(doc)
    }

    /// Seed the fixed demonstration set for an owner with no documents.
    ///
    /// Detected by "zero documents for this owner", so calling it again
    /// is a no-op. Returns the owner's documents either way.
    pub async fn ensure_seeded(&self, owner: &str) -> Result<Vec<Document>, StoreError> {
        let existing = self.store.list_documents(owner).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        info!(%owner, "Seeding demonstration documents");

        let samples = [
            ("Machine Learning Basics.pdf", true, 7),
            ("Systems Programming Guide.pdf", true, 1),
            ("Distributed Consensus.pdf", false, 0),
        ];

        for (filename, completed, age_days) in samples {
            let storage_path = format!("demo/{}", filename);
            let mut doc = Document::new(owner, filename, storage_path);
            doc.uploaded_at -= chrono::Duration::days(age_days);
            let id = doc.id;
            self.store.insert_document(doc).await?;
            self.store
                .update_status(id, ProcessingStatus::Processing)
                .await?;

            if completed {
                let contents = generator::generate_set(id, owner, filename);
                self.store.complete_document(id, contents).await?;
            }
        }

        self.store.list_documents(owner).await
    }
}

/// Timed stage progression for one document.
async fn advance(
    store: Arc<dyn DocumentStore>,
    delays: StageDelays,
    id: Uuid,
    owner: &str,
    filename: &str,
) -> Result<(), StoreError> {
    sleep(delays.upload).await;
    store.update_status(id, ProcessingStatus::Processing).await?;
    info!(document_id = %id, "Document PROCESSING");

    sleep(delays.processing).await;
    let contents = generator::generate_set(id, owner, filename);
    store.complete_document(id, contents).await?;
    info!(document_id = %id, "Document COMPLETED with artifact set");

    Ok(())
}
