//! docmind - Document intelligence engine
//!
//! Users upload PDFs, a processing pipeline derives study artifacts
//! (summary, mind map, flashcards), and a conversational engine answers
//! questions scoped to processed documents.
//!
//! # Architecture
//!
//! The system is built around an observable document lifecycle:
//! - The pipeline simulator advances each document's status through
//!   UPLOADING → PROCESSING → COMPLETED on timers and deposits the
//!   artifact triple atomically on completion
//! - The status poller converts that unobserved progression into a
//!   bounded, cancellable client-side refresh loop
//! - The chat engine runs one retrieval request at a time against the
//!   completed documents, reconciling each into exactly one reply
//!
//! # Modules
//!
//! - `adapters`: Retrieval collaborators (mock, HTTP)
//! - `chat`: Conversational query engine
//! - `domain`: Data structures (Document, GeneratedContent, ChatMessage)
//! - `ingest`: Upload validation and registration
//! - `pipeline`: Simulated processing pipeline
//! - `poll`: Lifecycle status poller
//! - `store`: Persistence seam and JSON-blob implementation
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Upload a document and watch it process
//! docmind upload notes.pdf
//! docmind watch <document-id>
//!
//! # Ask a question across all processed documents
//! docmind ask "What are the key concepts?"
//! ```

pub mod adapters;
pub mod chat;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod poll;
pub mod store;

// Re-export main types at crate root for convenience
pub use adapters::{HttpRetriever, MockRetriever, QueryResponse, RetrieveError, Retriever};
pub use chat::{ChatEngine, SendOutcome};
pub use domain::{
    ChatMessage, ContentPayload, ContentType, Document, GeneratedContent, MindMap,
    ProcessingStatus, Role, Source,
};
pub use ingest::{UploadError, UploadReceipt, Uploader};
pub use pipeline::{PipelineSimulator, StageDelays};
pub use poll::{PollConfig, PollHooks, PollState, StatusPoller};
pub use store::{DocumentStore, JsonStore, StoreError};
