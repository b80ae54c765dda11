//! File-backed store using full-table JSON blobs.
//!
//! Each entity lives in one namespaced file under the data directory and
//! is rewritten wholesale after every mutation; readers filter in memory
//! after a full load. A single async mutex serializes mutations, which is
//! what makes completion (status flip + artifact triple) atomic for
//! concurrent readers.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Document, GeneratedContent, ProcessingStatus};

use super::{DocumentStore, StoreError};

/// Table file for documents
const DOCUMENTS_TABLE: &str = "documents.json";

/// Table file for generated content
const CONTENT_TABLE: &str = "generated_content.json";

#[derive(Debug, Default)]
struct Tables {
    documents: Vec<Document>,
    contents: Vec<GeneratedContent>,
}

/// JSON-blob store rooted at a data directory
pub struct JsonStore {
    documents_path: PathBuf,
    content_path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonStore {
    /// Open (or initialize) a store under `dir`
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let documents_path = dir.join(DOCUMENTS_TABLE);
        let content_path = dir.join(CONTENT_TABLE);

        let documents = load_table(&documents_path).await?;
        let contents = load_table(&content_path).await?;

        debug!(
            documents = documents.len(),
            artifacts = contents.len(),
            "Opened store at {}",
            dir.display()
        );

        Ok(Self {
            documents_path,
            content_path,
            tables: Mutex::new(Tables {
                documents,
                contents,
            }),
        })
    }

    async fn persist_documents(&self, documents: &[Document]) -> Result<(), StoreError> {
        write_table(&self.documents_path, documents).await
    }

    async fn persist_contents(&self, contents: &[GeneratedContent]) -> Result<(), StoreError> {
        write_table(&self.content_path, contents).await
    }
}

async fn load_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

async fn write_table<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    let raw = serde_json::to_string_pretty(rows)?;
    fs::write(path, raw).await?;
    Ok(())
}

/// Validate that `contents` is exactly one artifact per content type,
/// all referencing `document_id`.
fn validate_content_set(
    document_id: Uuid,
    contents: &[GeneratedContent],
) -> Result<(), StoreError> {
    if contents.len() != 3 {
        return Err(StoreError::IncompleteContentSet(document_id));
    }

    let mut seen = HashSet::new();
    for content in contents {
        if content.document_id != document_id || !seen.insert(content.content_type()) {
            return Err(StoreError::IncompleteContentSet(document_id));
        }
    }

    Ok(())
}

#[async_trait::async_trait]
impl DocumentStore for JsonStore {
    async fn insert_document(&self, document: Document) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.documents.iter().any(|d| d.id == document.id) {
            return Err(StoreError::AlreadyExists(document.id));
        }

        tables.documents.push(document);
        self.persist_documents(&tables.documents).await
    }

    async fn get_document(&self, owner: &str, id: Uuid) -> Result<Document, StoreError> {
        let tables = self.tables.lock().await;

        let doc = tables
            .documents
            .iter()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if doc.owner != owner {
            return Err(StoreError::Forbidden {
                document: id,
                owner: owner.to_string(),
            });
        }

        Ok(doc.clone())
    }

    async fn list_documents(&self, owner: &str) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.lock().await;

        let mut docs: Vec<Document> = tables
            .documents
            .iter()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect();

        docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(docs)
    }

    async fn update_status(
        &self,
        id: Uuid,
        next: ProcessingStatus,
    ) -> Result<Document, StoreError> {
        let mut tables = self.tables.lock().await;

        let doc = tables
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;

        // Completion must go through complete_document so the artifact
        // triple lands in the same step.
        if next == ProcessingStatus::Completed || !doc.processing_status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: doc.processing_status,
                to: next,
            });
        }

        doc.processing_status = next;
        let updated = doc.clone();
        self.persist_documents(&tables.documents).await?;

        Ok(updated)
    }

    async fn complete_document(
        &self,
        id: Uuid,
        contents: Vec<GeneratedContent>,
    ) -> Result<Document, StoreError> {
        validate_content_set(id, &contents)?;

        let mut tables = self.tables.lock().await;

        let position = tables
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let from = tables.documents[position].processing_status;
        if !from.can_transition_to(ProcessingStatus::Completed) {
            return Err(StoreError::InvalidTransition {
                from,
                to: ProcessingStatus::Completed,
            });
        }

        if tables.contents.iter().any(|c| c.document_id == id) {
            return Err(StoreError::ContentExists(id));
        }

        tables.documents[position].processing_status = ProcessingStatus::Completed;
        let updated = tables.documents[position].clone();

        tables.contents.extend(contents);

        self.persist_contents(&tables.contents).await?;
        self.persist_documents(&tables.documents).await?;

        Ok(updated)
    }

    async fn generated_for(
        &self,
        owner: &str,
        document_id: Uuid,
    ) -> Result<Vec<GeneratedContent>, StoreError> {
        let tables = self.tables.lock().await;

        let doc = tables
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .ok_or(StoreError::NotFound(document_id))?;

        if doc.owner != owner {
            return Err(StoreError::Forbidden {
                document: document_id,
                owner: owner.to_string(),
            });
        }

        Ok(tables
            .contents
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn delete_document(&self, owner: &str, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;

        let position = tables
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if tables.documents[position].owner != owner {
            return Err(StoreError::Forbidden {
                document: id,
                owner: owner.to_string(),
            });
        }

        tables.documents.remove(position);
        tables.contents.retain(|c| c.document_id != id);

        self.persist_documents(&tables.documents).await?;
        self.persist_contents(&tables.contents).await?;

        Ok(())
    }
}
