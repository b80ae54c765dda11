//! Retrieval collaborators.
//!
//! The query engine talks to whichever backend answers conversational
//! questions through the [`Retriever`] seam: the local mock for offline
//! use, or the HTTP client against a real service.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Source;

pub mod http;
pub mod mock;

pub use http::HttpRetriever;
pub use mock::MockRetriever;

/// Errors surfaced by a retrieval request.
///
/// Callers treat every variant the same way (the first failure ends the
/// request); the split exists so messages stay descriptive.
#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("Retrieval backend unreachable: {0}")]
    Unreachable(String),

    #[error("Retrieval request rejected: {0}")]
    Rejected(String),

    #[error("Selected document not found: {0}")]
    DocumentNotFound(Uuid),
}

/// Answer plus citations for one query
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryResponse {
    pub answer: String,

    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A backend capable of answering a query scoped to a document selection.
///
/// An empty `document_ids` slice means "search all eligible documents".
/// Implementations do not retry; the engine surfaces the first failure.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn query(
        &self,
        query: &str,
        document_ids: &[Uuid],
    ) -> Result<QueryResponse, RetrieveError>;
}
